//! Document and version records as they arrive from document storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One version of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Version ID (unique across all documents)
    pub id: String,
    /// Version number within its own record's lineage
    #[serde(alias = "versionNumber")]
    pub version_number: i64,
    /// URL of this version's content
    pub path: String,
    /// Creation timestamp
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Actor or process that produced the version
    #[serde(default, alias = "generatedBy")]
    pub generated_by: String,
}

/// A document record with its version history attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stored file ID
    pub id: String,
    /// Document type, the grouping key
    #[serde(rename = "type")]
    pub owner_type: String,
    /// Display name of the most recent file
    pub name: String,
    /// URL of the current content
    pub path: String,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Advisory current-file flag
    pub is_current: bool,
    /// Version history
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

/// A document record exactly as document storage serializes it.
///
/// The type may be missing and `is_current` may be absent or null;
/// [`DocumentRecord::try_from`] normalizes both.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocumentRecord {
    pub id: String,
    #[serde(default, rename = "type", alias = "ownerType", alias = "owner_type")]
    pub owner_type: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, alias = "isCurrent")]
    pub is_current: Option<bool>,
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

impl TryFrom<RawDocumentRecord> for DocumentRecord {
    type Error = CoreError;

    fn try_from(raw: RawDocumentRecord) -> CoreResult<Self> {
        let owner_type = raw
            .owner_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoreError::InvalidInput(format!("document {} has no type", raw.id)))?;

        Ok(Self {
            id: raw.id,
            owner_type,
            name: raw.name,
            path: raw.path,
            updated_at: raw.updated_at,
            // Storage omits the flag on records that predate it; those are current.
            is_current: raw.is_current.unwrap_or(true),
            versions: raw.versions,
        })
    }
}

/// Normalize a batch of raw records, rejecting the first malformed one.
pub fn normalize_records(raw: Vec<RawDocumentRecord>) -> CoreResult<Vec<DocumentRecord>> {
    raw.into_iter().map(DocumentRecord::try_from).collect()
}
