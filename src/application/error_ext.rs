//! Error conversion helpers for connection API calls
//!
//! Provides an extension trait for cleaner error handling with operation context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::ApiResult;

/// Extension trait for converting `ApiResult` to `ApplicationResult` with context.
pub trait ApiResultExt<T> {
    /// Add operation context to an API error.
    ///
    /// # Example
    /// ```ignore
    /// self.api.delete(id).with_context("delete connection")?;
    /// ```
    fn with_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> ApiResultExt<T> for ApiResult<T> {
    fn with_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Api {
            context: action.to_string(),
            source,
        })
    }
}
