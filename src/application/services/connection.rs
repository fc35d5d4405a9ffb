//! Connection management service
//!
//! Backs the `connection list|view|delete|create` subcommands.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::application::{ApiResultExt, ApplicationResult};
use crate::domain::{Connection, ConnectionPage, DomainError, NewConnection, PageRequest, Platform};
use crate::infrastructure::traits::ConnectionApi;

/// Parameters for `connection create`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    /// Value of `--type`, parsed into a [`Platform`]
    pub platform: Option<String>,
    pub name: Option<String>,
}

/// Service for listing, viewing, creating and deleting connections.
pub struct ConnectionService {
    api: Arc<dyn ConnectionApi>,
}

impl ConnectionService {
    /// Create a new connection service.
    pub fn new(api: Arc<dyn ConnectionApi>) -> Self {
        Self { api }
    }

    /// Fetch one page of connections.
    pub fn list(&self, request: &PageRequest) -> ApplicationResult<ConnectionPage> {
        request.validate()?;
        debug!(
            "list: page={} page_size={} search={:?}",
            request.page, request.page_size, request.search
        );
        self.api.list(request).with_context("list connections")
    }

    /// Total number of stored connections.
    pub fn count(&self) -> ApplicationResult<u64> {
        let page = self
            .api
            .list(&PageRequest::new(1, 1))
            .with_context("count connections")?;
        Ok(page.total_count)
    }

    /// Connections to display for `connection view`.
    ///
    /// With a name, only exact (case-insensitive) matches are returned and an
    /// empty result is an error. Without a name, every connection is returned.
    pub fn view(&self, name: Option<&str>) -> ApplicationResult<Vec<Connection>> {
        match name {
            Some(name) => {
                let page = self
                    .api
                    .list(&PageRequest::all().with_search(name))
                    .with_context("view connection")?;
                let matches: Vec<Connection> = page
                    .connections
                    .into_iter()
                    .filter(|c| c.name.eq_ignore_ascii_case(name))
                    .collect();
                debug!("view: {} match(es) for '{}'", matches.len(), name);
                if matches.is_empty() {
                    return Err(DomainError::ConnectionNotFound(name.to_string()).into());
                }
                Ok(matches)
            }
            None => {
                let page = self
                    .api
                    .list(&PageRequest::all())
                    .with_context("view connections")?;
                Ok(page.connections)
            }
        }
    }

    /// Delete a connection by id.
    pub fn delete(&self, id: &str) -> ApplicationResult<Uuid> {
        let id = Uuid::parse_str(id.trim())
            .map_err(|_| DomainError::InvalidConnectionId(id.to_string()))?;
        debug!("delete: id={}", id);
        self.api.delete(id).with_context("delete connection")?;
        Ok(id)
    }

    /// Register a new connection for the requested platform.
    pub fn create(&self, request: &CreateRequest) -> ApplicationResult<Connection> {
        let raw = request.platform.as_deref().unwrap_or_default();
        let platform: Platform = raw.parse()?;
        let name = request
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{platform}-connection"));
        debug!("create: platform={} name={}", platform, name);

        let body = NewConnection::kubernetes(name, platform);
        self.api.create(&body).with_context("create connection")
    }
}
