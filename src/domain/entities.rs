//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Default number of connections per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A stored reference to an external platform or service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    /// e.g. "kubernetes", "prometheus", "grafana"
    #[serde(default)]
    pub kind: String,
    #[serde(rename = "type", default)]
    pub connection_type: String,
    #[serde(default)]
    pub sub_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One page of connections as returned by the connection API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPage {
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub total_count: u64,
    /// Zero-based page index
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

impl ConnectionPage {
    /// Number of pages needed for `total_count` at this page size.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total_count.div_ceil(u64::from(self.page_size)).max(1)
    }
}

/// How many connections to request per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limit(u32),
    All,
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Limit(n) => write!(f, "{n}"),
            PageSize::All => f.write_str("all"),
        }
    }
}

/// Paging and search parameters for a list request.
///
/// `page` is one-based, as typed by the user; the API receives `page - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: PageSize,
    pub search: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::Limit(DEFAULT_PAGE_SIZE),
            search: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: PageSize::Limit(page_size),
            search: None,
        }
    }

    /// Request every connection in a single page.
    pub fn all() -> Self {
        Self {
            page: 1,
            page_size: PageSize::All,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.page == 0 {
            return Err(DomainError::InvalidPage(self.page));
        }
        if let PageSize::Limit(0) = self.page_size {
            return Err(DomainError::InvalidPageSize(0));
        }
        Ok(())
    }

    /// Zero-based page index sent to the API.
    pub fn api_page(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

/// Platforms a connection can be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Aks,
    Eks,
    Gke,
    Minikube,
}

impl Platform {
    pub const ALL: [Platform; 4] = [Platform::Aks, Platform::Eks, Platform::Gke, Platform::Minikube];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Aks => "aks",
            Platform::Eks => "eks",
            Platform::Gke => "gke",
            Platform::Minikube => "minikube",
        }
    }

    /// Supported values joined for error messages, e.g. "aks, eks, gke, minikube".
    pub fn supported() -> String {
        Self::ALL.iter().map(Platform::as_str).join(", ")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| DomainError::UnsupportedPlatform {
                value: s.to_string(),
                supported: Self::supported(),
            })
    }
}

/// Request body for registering a new connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConnection {
    pub name: String,
    pub kind: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub sub_type: String,
    pub platform: String,
}

impl NewConnection {
    /// Kubernetes connection for a managed or local cluster platform.
    pub fn kubernetes(name: impl Into<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            kind: "kubernetes".to_string(),
            connection_type: "platform".to_string(),
            sub_type: "orchestration".to_string(),
            platform: platform.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_zero_page_when_validating_then_rejects() {
        let req = PageRequest::new(0, 10);
        assert_eq!(req.validate(), Err(DomainError::InvalidPage(0)));
    }

    #[test]
    fn given_zero_page_size_when_validating_then_rejects() {
        let req = PageRequest::new(1, 0);
        assert_eq!(req.validate(), Err(DomainError::InvalidPageSize(0)));
    }

    #[test]
    fn given_one_based_page_when_converting_then_api_page_is_zero_based() {
        assert_eq!(PageRequest::new(1, 10).api_page(), 0);
        assert_eq!(PageRequest::new(4, 10).api_page(), 3);
    }

    #[test]
    fn given_mixed_case_platform_when_parsing_then_matches() {
        assert_eq!("GKE".parse::<Platform>().unwrap(), Platform::Gke);
        assert_eq!(" minikube ".parse::<Platform>().unwrap(), Platform::Minikube);
    }

    #[test]
    fn given_unknown_platform_when_parsing_then_lists_supported() {
        let err = "openshift".parse::<Platform>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("openshift"));
        assert!(msg.contains("aks, eks, gke, minikube"));
    }

    #[test]
    fn given_page_metadata_when_computing_total_pages_then_rounds_up() {
        let page = ConnectionPage {
            connections: vec![],
            total_count: 21,
            page: 0,
            page_size: 10,
        };
        assert_eq!(page.total_pages(), 3);

        let empty = ConnectionPage {
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(empty.total_pages(), 1);
    }

    #[test]
    fn given_api_json_when_deserializing_then_maps_type_field() {
        let json = r#"{
            "id": "6f1d2c3b-8a8e-4c55-9a51-2f0d7f3a9c10",
            "name": "prod-cluster",
            "kind": "kubernetes",
            "type": "platform",
            "sub_type": "orchestration",
            "status": "connected",
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let conn: Connection = serde_json::from_str(json).unwrap();
        assert_eq!(conn.name, "prod-cluster");
        assert_eq!(conn.connection_type, "platform");
        assert!(conn.credential_id.is_none());
        assert!(conn.created_at.is_some());
    }
}
