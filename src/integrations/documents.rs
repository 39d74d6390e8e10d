//! Document storage service.
//!
//! Lists a startup's documents, fetches per-document version history and
//! uploads new files.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::client::{ApiClient, ApiResult};
use crate::documents::{RawDocumentRecord, VersionRecord};

/// A file to upload as a new document.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Owning startup
    pub startup_id: String,
    /// Display name for the document
    pub doc_name: String,
    /// Document type (grouping key)
    pub doc_type: String,
    /// Original file name
    pub file_name: String,
    /// File contents
    pub contents: Vec<u8>,
}

/// Access to stored documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document record for a startup, without versions.
    async fn list_documents(&self, startup_id: &str) -> ApiResult<Vec<RawDocumentRecord>>;

    /// Fetch the version history of one document.
    async fn version_history(&self, document_id: &str) -> ApiResult<Vec<VersionRecord>>;

    /// Upload a file as a new document record.
    async fn upload(&self, request: UploadRequest) -> ApiResult<RawDocumentRecord>;
}

/// Document storage over the backend REST API.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    api: ApiClient,
}

impl HttpDocumentStore {
    /// Create a store on top of a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list_documents(&self, startup_id: &str) -> ApiResult<Vec<RawDocumentRecord>> {
        let path = format!("documents?startupId={}", urlencoding::encode(startup_id));
        self.api.get_json(&path).await
    }

    async fn version_history(&self, document_id: &str) -> ApiResult<Vec<VersionRecord>> {
        let path = format!("documents/history/{}", urlencoding::encode(document_id));
        self.api.get_json(&path).await
    }

    async fn upload(&self, request: UploadRequest) -> ApiResult<RawDocumentRecord> {
        let file = Part::bytes(request.contents).file_name(request.file_name);
        let form = Form::new()
            .part("file", file)
            .text("startupId", request.startup_id)
            .text("docName", request.doc_name)
            .text("type", request.doc_type);

        let builder = self.api.request(reqwest::Method::POST, "documents/upload").multipart(form);
        self.api.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_default() {
        let request = UploadRequest::default();
        assert!(request.startup_id.is_empty());
        assert!(request.contents.is_empty());
    }
}
