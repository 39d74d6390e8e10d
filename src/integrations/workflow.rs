//! Workflow storage service.

use async_trait::async_trait;

use super::client::{ApiClient, ApiResult};
use crate::workflow::WorkflowRecord;

/// Access to a startup's persisted workflow record.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch the full workflow record. `None` when the startup has none yet.
    async fn fetch(&self, startup_id: &str) -> ApiResult<Option<WorkflowRecord>>;

    /// Replace the full workflow record.
    async fn update(&self, record: &WorkflowRecord) -> ApiResult<WorkflowRecord>;
}

/// Workflow storage over the backend REST API.
#[derive(Debug, Clone)]
pub struct HttpWorkflowStore {
    api: ApiClient,
}

impl HttpWorkflowStore {
    /// Create a store on top of a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WorkflowStore for HttpWorkflowStore {
    async fn fetch(&self, startup_id: &str) -> ApiResult<Option<WorkflowRecord>> {
        let path = format!("workflow/{}", urlencoding::encode(startup_id));

        match self.api.get_json::<Option<WorkflowRecord>>(&path).await {
            Ok(record) => Ok(record),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update(&self, record: &WorkflowRecord) -> ApiResult<WorkflowRecord> {
        self.api.post_json("workflow/update", record).await
    }
}
