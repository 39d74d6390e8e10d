//! The persisted per-startup workflow record.
//!
//! Workflow storage keeps every stage flag for a startup in one JSON object.
//! Updates replace the whole object, so the record keeps every field it was
//! read with, known or not, and only ever touches the flag being set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::stage::StageName;

const STARTUP_ID: &str = "startup_id";
const STARTUP_ID_CAMEL: &str = "startupId";

/// Spelling of the startup ID key, kept so write-backs match the read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum IdKey {
    #[default]
    Snake,
    Camel,
}

impl IdKey {
    fn as_str(self) -> &'static str {
        match self {
            Self::Snake => STARTUP_ID,
            Self::Camel => STARTUP_ID_CAMEL,
        }
    }
}

/// A startup's workflow record.
///
/// Serialized as one flat JSON object: the startup ID under the key it was
/// read with (`startup_id` for new records) plus every other field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct WorkflowRecord {
    /// Owning startup
    pub startup_id: String,

    /// Stage flags and any other fields storage keeps on the record
    pub fields: BTreeMap<String, Value>,

    id_key: IdKey,
}

impl WorkflowRecord {
    /// A fresh record with no stage flags set.
    pub fn new(startup_id: impl Into<String>) -> Self {
        Self { startup_id: startup_id.into(), fields: BTreeMap::new(), id_key: IdKey::Snake }
    }

    /// Whether a stage is marked complete. Missing or non-boolean is false.
    pub fn stage_flag(&self, stage: StageName) -> bool {
        self.fields.get(stage.key()).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Set a stage's completion flag.
    pub fn set_stage_flag(&mut self, stage: StageName, done: bool) {
        self.fields.insert(stage.key().to_string(), Value::Bool(done));
    }
}

impl TryFrom<BTreeMap<String, Value>> for WorkflowRecord {
    type Error = String;

    fn try_from(mut fields: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        let (id_key, value) = match fields.remove(STARTUP_ID) {
            Some(value) => (IdKey::Snake, value),
            None => match fields.remove(STARTUP_ID_CAMEL) {
                Some(value) => (IdKey::Camel, value),
                None => return Err(format!("missing field `{STARTUP_ID}`")),
            },
        };

        let startup_id = match value {
            Value::String(id) => id,
            other => return Err(format!("`{}` must be a string, got {other}", id_key.as_str())),
        };

        Ok(Self { startup_id, fields, id_key })
    }
}

impl From<WorkflowRecord> for BTreeMap<String, Value> {
    fn from(record: WorkflowRecord) -> Self {
        let mut out = record.fields;
        out.insert(record.id_key.as_str().to_string(), Value::String(record.startup_id));
        out
    }
}
