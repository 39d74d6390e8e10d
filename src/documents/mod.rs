//! Founder document views.
//!
//! Document storage keeps one record per uploaded file lineage, and several
//! lineages can share a document type. This module turns those records into
//! one card per type with a merged, newest-first version history.
//!
//! - [`aggregate`] - pure grouping of already-fetched records
//! - [`select_path`] - which file to open for a card and a version choice
//! - [`DocumentLoader`] - fetches records and histories, then aggregates

mod aggregate;
mod loader;
mod model;

pub use aggregate::{aggregate, select_path, DocumentGroup, VersionSelection};
pub use loader::{Aggregation, DocumentLoader};
pub use model::{normalize_records, DocumentRecord, RawDocumentRecord, VersionRecord};
