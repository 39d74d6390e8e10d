//! Fetches a startup's documents and their histories, then aggregates them.

use std::sync::Arc;

use futures::future::join_all;

use super::aggregate::{aggregate, DocumentGroup};
use super::model::{normalize_records, DocumentRecord};
use crate::error::{CoreError, CoreResult};
use crate::integrations::DocumentStore;

/// Aggregated documents plus the non-fatal problems hit while loading them.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// One group per document type
    pub groups: Vec<DocumentGroup>,
    /// `PartialHistoryUnavailable` for every history that failed to load
    pub warnings: Vec<CoreError>,
}

impl Aggregation {
    /// Find the group for a document type.
    pub fn group(&self, owner_type: &str) -> Option<&DocumentGroup> {
        self.groups.iter().find(|g| g.owner_type == owner_type)
    }

    /// Whether every history loaded.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Loads and aggregates documents from document storage.
pub struct DocumentLoader {
    store: Arc<dyn DocumentStore>,
}

impl DocumentLoader {
    /// Create a loader over a document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch every document record for a startup, without histories.
    pub async fn records(&self, startup_id: &str) -> CoreResult<Vec<DocumentRecord>> {
        let raw = self
            .store
            .list_documents(startup_id)
            .await
            .map_err(|e| CoreError::upstream("document storage", &e))?;
        normalize_records(raw)
    }

    /// Load and aggregate a startup's documents.
    ///
    /// History fetches run concurrently and are all awaited before grouping.
    /// A failed history leaves that record with no versions and adds a
    /// warning; it never fails the load.
    pub async fn load(&self, startup_id: &str) -> CoreResult<Aggregation> {
        let records = self.records(startup_id).await?;
        tracing::debug!(startup_id, count = records.len(), "loading version histories");

        let fetches = records.iter().map(|r| self.store.version_history(&r.id));
        let histories = join_all(fetches).await;

        let mut warnings = Vec::new();
        let mut resolved = Vec::with_capacity(records.len());

        for (mut record, history) in records.into_iter().zip(histories) {
            match history {
                Ok(versions) => record.versions = versions,
                Err(e) => {
                    tracing::warn!(document_id = %record.id, error = %e, "version history unavailable");
                    warnings.push(CoreError::PartialHistoryUnavailable {
                        document_id: record.id.clone(),
                        reason: e.to_string(),
                    });
                    record.versions.clear();
                }
            }
            resolved.push(record);
        }

        let groups = aggregate(resolved)?;
        Ok(Aggregation { groups, warnings })
    }
}
