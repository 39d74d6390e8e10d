//! Error types for the founder dashboard core.
//!
//! Transport-level failures live in [`crate::integrations::ApiError`]; this
//! module holds the taxonomy callers of the aggregator and the stage
//! controller branch on.

use crate::integrations::ApiError;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the aggregator, loader and stage controller.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: &'static str, message: String },

    #[error("Workflow update failed: {0}")]
    ConflictOrUpstreamError(String),

    #[error("Version history unavailable for document {document_id}: {reason}")]
    PartialHistoryUnavailable { document_id: String, reason: String },
}

impl CoreError {
    /// Wrap a collaborator failure on a read path.
    pub fn upstream(service: &'static str, err: &ApiError) -> Self {
        let message = if err.is_timeout() { "request timed out".to_string() } else { err.to_string() };
        Self::UpstreamUnavailable { service, message }
    }

    /// Whether this error leaves the caller in a degraded but usable state.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PartialHistoryUnavailable { .. })
    }
}
