//! Artifact generation service.
//!
//! The backend currently produces mock reports; a successful call makes a new
//! document of the requested type appear in document storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError, ApiResult};
use crate::documents::RawDocumentRecord;

/// Reply from a generation request.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationReceipt {
    /// Whether the backend produced the artifact
    #[serde(default)]
    pub success: bool,
    /// Human-readable status or failure reason
    #[serde(default)]
    pub message: Option<String>,
    /// The new document, when the backend returns it
    #[serde(default)]
    pub document: Option<RawDocumentRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    startup_id: &'a str,
    #[serde(rename = "type")]
    doc_type: &'a str,
}

/// Produces stage artifacts.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Generate a document of `doc_type` for a startup.
    ///
    /// A reply with `success: false` is an error.
    async fn generate(&self, startup_id: &str, doc_type: &str) -> ApiResult<GenerationReceipt>;
}

/// Artifact generation over the backend REST API.
#[derive(Debug, Clone)]
pub struct HttpArtifactGenerator {
    api: ApiClient,
}

impl HttpArtifactGenerator {
    /// Create a generator on top of a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ArtifactGenerator for HttpArtifactGenerator {
    async fn generate(&self, startup_id: &str, doc_type: &str) -> ApiResult<GenerationReceipt> {
        let body = GenerateBody { startup_id, doc_type };
        let receipt: GenerationReceipt = self.api.post_json("documents/generate-mock", &body).await?;

        if !receipt.success {
            let reason = receipt.message.unwrap_or_else(|| "generation failed".to_string());
            return Err(ApiError::Rejected(reason));
        }

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_body_shape() {
        let body = GenerateBody { startup_id: "s1", doc_type: "Evaluation Report" };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"startupId": "s1", "type": "Evaluation Report"}));
    }

    #[test]
    fn test_receipt_defaults() {
        let receipt: GenerationReceipt = serde_json::from_str("{}").unwrap();
        assert!(!receipt.success);
        assert!(receipt.message.is_none());
        assert!(receipt.document.is_none());
    }
}
