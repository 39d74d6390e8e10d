//! Backend integrations.
//!
//! Provides HTTP clients for the three services the dashboard core talks to:
//! document storage, workflow storage and artifact generation. Each service
//! is a trait so the aggregator and stage controller can run against
//! in-memory fakes.

pub mod client;
pub mod documents;
pub mod generation;
pub mod workflow;

use std::sync::Arc;

pub use client::{ApiClient, ApiError, ApiResult};
pub use documents::{DocumentStore, HttpDocumentStore, UploadRequest};
pub use generation::{ArtifactGenerator, GenerationReceipt, HttpArtifactGenerator};
pub use workflow::{HttpWorkflowStore, WorkflowStore};

/// The three backend services, sharing one HTTP client.
#[derive(Clone)]
pub struct Backend {
    pub documents: Arc<dyn DocumentStore>,
    pub workflow: Arc<dyn WorkflowStore>,
    pub generator: Arc<dyn ArtifactGenerator>,
}

impl Backend {
    /// Build HTTP-backed services from API configuration.
    pub fn http(config: &crate::core::ApiConfig) -> ApiResult<Self> {
        let api = ApiClient::new(config)?;
        Ok(Self {
            documents: Arc::new(HttpDocumentStore::new(api.clone())),
            workflow: Arc::new(HttpWorkflowStore::new(api.clone())),
            generator: Arc::new(HttpArtifactGenerator::new(api)),
        })
    }
}
