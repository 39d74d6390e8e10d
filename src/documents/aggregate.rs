//! Grouping of document records into one card per document type.
//!
//! Several stored records can share a type (re-uploads, generated reports).
//! [`aggregate`] folds them into a single [`DocumentGroup`] whose scalar
//! fields come from the most recently updated record and whose history is
//! the union of every record's versions.

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::model::{DocumentRecord, VersionRecord};
use crate::error::{CoreError, CoreResult};

/// All records of one document type, merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentGroup {
    /// Document type shared by every merged record
    pub owner_type: String,
    /// ID of the representative record
    pub id: String,
    /// Name of the representative record
    pub name: String,
    /// Path of the representative record
    pub path: String,
    /// Latest `updated_at` seen for this type
    pub updated_at: DateTime<Utc>,
    /// Representative record's current flag
    pub is_current: bool,
    /// Merged history, newest first, unique by ID
    pub versions: Vec<VersionRecord>,
}

impl DocumentGroup {
    fn seed(record: DocumentRecord) -> Self {
        Self {
            owner_type: record.owner_type,
            id: record.id,
            name: record.name,
            path: record.path,
            updated_at: record.updated_at,
            is_current: record.is_current,
            versions: record.versions,
        }
    }

    /// Fold another record of the same type into this group.
    fn absorb(&mut self, record: DocumentRecord) {
        self.versions.extend(record.versions);

        // Strictly newer only: on equal timestamps the first record seen stays.
        if record.updated_at > self.updated_at {
            self.id = record.id;
            self.name = record.name;
            self.path = record.path;
            self.updated_at = record.updated_at;
            self.is_current = record.is_current;
        }
    }

    fn finish(&mut self) {
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(self.versions.len());
        let mut unique: Vec<VersionRecord> = Vec::with_capacity(self.versions.len());

        for version in self.versions.drain(..) {
            if let Some(&pos) = positions.get(&version.id) {
                unique[pos] = version;
            } else {
                positions.insert(version.id.clone(), unique.len());
                unique.push(version);
            }
        }

        unique.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.versions = unique;
    }

    /// Look up a version by ID.
    pub fn version(&self, id: &str) -> Option<&VersionRecord> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Most recent version, if any history exists.
    pub fn latest_version(&self) -> Option<&VersionRecord> {
        self.versions.first()
    }
}

/// Group records by document type.
///
/// Groups come out in order of each type's first appearance. Fails with
/// [`CoreError::InvalidInput`] if any record has a blank type.
pub fn aggregate<I>(records: I) -> CoreResult<Vec<DocumentGroup>>
where
    I: IntoIterator<Item = DocumentRecord>,
{
    let mut groups: Vec<DocumentGroup> = Vec::new();
    let mut by_type: HashMap<String, usize> = HashMap::new();

    for record in records {
        if record.owner_type.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!("document {} has no type", record.id)));
        }

        match by_type.get(&record.owner_type) {
            Some(&idx) => groups[idx].absorb(record),
            None => {
                by_type.insert(record.owner_type.clone(), groups.len());
                groups.push(DocumentGroup::seed(record));
            }
        }
    }

    for group in &mut groups {
        group.finish();
    }

    Ok(groups)
}

/// Which version of a group to open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionSelection {
    /// The group's representative file
    #[default]
    Latest,
    /// A specific version by ID
    Version(String),
}

impl FromStr for VersionSelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("latest") {
            Ok(Self::Latest)
        } else {
            Ok(Self::Version(s.to_string()))
        }
    }
}

impl From<Option<&str>> for VersionSelection {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Latest, |s| s.parse().unwrap_or_default())
    }
}

/// Resolve the path to open for a group.
///
/// An unknown version ID falls back to the representative path.
pub fn select_path<'a>(group: &'a DocumentGroup, selection: &VersionSelection) -> &'a str {
    match selection {
        VersionSelection::Latest => &group.path,
        VersionSelection::Version(id) => match group.version(id) {
            Some(version) => &version.path,
            None => {
                tracing::debug!(
                    owner_type = %group.owner_type,
                    version = %id,
                    "selected version not found, using latest"
                );
                &group.path
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn version(id: &str, created: DateTime<Utc>) -> VersionRecord {
        VersionRecord {
            id: id.to_string(),
            version_number: 1,
            path: format!("https://files.example/{id}"),
            created_at: created,
            generated_by: "founder".to_string(),
        }
    }

    fn record(id: &str, ty: &str, updated: DateTime<Utc>, versions: Vec<VersionRecord>) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            owner_type: ty.to_string(),
            name: format!("{id}.pdf"),
            path: format!("https://files.example/{id}.pdf"),
            updated_at: updated,
            is_current: true,
            versions,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::<DocumentRecord>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_financials_example() {
        let records = vec![
            record("d1", "Financials", ts(2024, 1, 1), vec![version("v1", ts(2024, 1, 1))]),
            record("d2", "Financials", ts(2024, 2, 1), vec![version("v2", ts(2024, 2, 1))]),
        ];

        let groups = aggregate(records).unwrap();
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.owner_type, "Financials");
        assert_eq!(group.id, "d2");
        assert_eq!(group.updated_at, ts(2024, 2, 1));
        let ids: Vec<&str> = group.versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1"]);
    }

    #[test]
    fn test_one_group_per_type_in_first_seen_order() {
        let records = vec![
            record("a", "Legal Docs", ts(2024, 1, 1), vec![]),
            record("b", "Financials", ts(2024, 1, 2), vec![]),
            record("c", "Legal Docs", ts(2024, 1, 3), vec![]),
            record("d", "Pitch Deck", ts(2024, 1, 4), vec![]),
        ];

        let groups = aggregate(records).unwrap();
        let types: Vec<&str> = groups.iter().map(|g| g.owner_type.as_str()).collect();
        assert_eq!(types, vec!["Legal Docs", "Financials", "Pitch Deck"]);
    }

    #[test]
    fn test_newer_record_wins_regardless_of_order() {
        let newer = record("new", "Financials", ts(2024, 5, 1), vec![]);
        let older = record("old", "Financials", ts(2024, 4, 1), vec![]);

        let forward = aggregate(vec![older.clone(), newer.clone()]).unwrap();
        let backward = aggregate(vec![newer, older]).unwrap();

        assert_eq!(forward[0].id, "new");
        assert_eq!(backward[0].id, "new");
        assert_eq!(forward[0].path, "https://files.example/new.pdf");
    }

    #[test]
    fn test_equal_timestamps_first_seen_wins() {
        let mut first = record("first", "Financials", ts(2024, 5, 1), vec![]);
        first.is_current = false;
        let second = record("second", "Financials", ts(2024, 5, 1), vec![]);

        let groups = aggregate(vec![first, second]).unwrap();
        assert_eq!(groups[0].id, "first");
        assert_eq!(groups[0].name, "first.pdf");
        assert!(!groups[0].is_current);
    }

    #[test]
    fn test_versions_deduplicated_by_id() {
        let shared = version("v-shared", ts(2024, 1, 5));
        let mut replaced = shared.clone();
        replaced.generated_by = "generator".to_string();

        let records = vec![
            record("a", "Financials", ts(2024, 1, 1), vec![shared, version("v-a", ts(2024, 1, 1))]),
            record("b", "Financials", ts(2024, 1, 2), vec![replaced, version("v-b", ts(2024, 1, 9))]),
        ];

        let group = &aggregate(records).unwrap()[0];
        assert_eq!(group.versions.len(), 3);

        let ids: HashSet<&str> = group.versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids.len(), group.versions.len());

        // Last occurrence wins.
        assert_eq!(group.version("v-shared").unwrap().generated_by, "generator");
    }

    #[test]
    fn test_versions_sorted_newest_first() {
        let records = vec![
            record(
                "a",
                "Legal Docs",
                ts(2024, 1, 1),
                vec![version("v1", ts(2023, 6, 1)), version("v3", ts(2024, 2, 1))],
            ),
            record("b", "Legal Docs", ts(2024, 1, 2), vec![version("v2", ts(2023, 12, 1))]),
        ];

        let group = &aggregate(records).unwrap()[0];
        assert!(group.versions.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(group.latest_version().unwrap().id, "v3");
    }

    #[test]
    fn test_duplicate_version_numbers_across_records_kept() {
        let mut v_a = version("va", ts(2024, 1, 1));
        let mut v_b = version("vb", ts(2024, 1, 2));
        v_a.version_number = 1;
        v_b.version_number = 1;

        let records = vec![
            record("a", "Financials", ts(2024, 1, 1), vec![v_a]),
            record("b", "Financials", ts(2024, 1, 2), vec![v_b]),
        ];
        assert_eq!(aggregate(records).unwrap()[0].versions.len(), 2);
    }

    #[test]
    fn test_blank_type_rejected() {
        let records = vec![record("a", " ", ts(2024, 1, 1), vec![])];
        assert!(matches!(aggregate(records), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_select_latest_returns_representative_path() {
        let records = vec![record("d1", "Financials", ts(2024, 1, 1), vec![version("v1", ts(2024, 1, 1))])];
        let group = &aggregate(records).unwrap()[0];

        assert_eq!(select_path(group, &VersionSelection::Latest), group.path);
        assert_eq!(select_path(group, &"latest".parse().unwrap()), group.path);
        assert_eq!(select_path(group, &VersionSelection::from(None)), group.path);
    }

    #[test]
    fn test_select_specific_version() {
        let records = vec![record("d1", "Financials", ts(2024, 1, 1), vec![version("v1", ts(2024, 1, 1))])];
        let group = &aggregate(records).unwrap()[0];

        let selection = VersionSelection::Version("v1".to_string());
        assert_eq!(select_path(group, &selection), "https://files.example/v1");
    }

    #[test]
    fn test_select_unknown_version_falls_back() {
        let records = vec![record("d1", "Financials", ts(2024, 1, 1), vec![version("v1", ts(2024, 1, 1))])];
        let group = &aggregate(records).unwrap()[0];

        let selection = VersionSelection::from(Some("missing"));
        assert_eq!(select_path(group, &selection), group.path);
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!("LATEST".parse::<VersionSelection>().unwrap(), VersionSelection::Latest);
        assert_eq!("".parse::<VersionSelection>().unwrap(), VersionSelection::Latest);
        assert_eq!(
            " v7 ".parse::<VersionSelection>().unwrap(),
            VersionSelection::Version("v7".to_string())
        );
    }
}
