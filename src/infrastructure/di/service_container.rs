//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ConnectionService;
use crate::config::Context;
use crate::infrastructure::http::HttpConnectionApi;
use crate::infrastructure::traits::ConnectionApi;
use crate::infrastructure::InfraResult;

/// Container holding all application services for one invocation.
pub struct ServiceContainer {
    pub connections: ConnectionService,
}

impl ServiceContainer {
    /// Create a new service container talking HTTP to the context's endpoint.
    pub fn new(context: Context) -> InfraResult<Self> {
        let api = Arc::new(HttpConnectionApi::new(&context)?);
        Ok(Self::with_deps(api))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(api: Arc<dyn ConnectionApi>) -> Self {
        Self {
            connections: ConnectionService::new(api),
        }
    }
}
