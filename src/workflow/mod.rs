//! Startup workflow stages.
//!
//! Each stage (evaluation, market research, ...) moves through
//! `NotGenerated -> Generated -> Completed`. Regenerating an artifact sends a
//! completed stage back to `Generated` so it is reviewed again.
//!
//! ## Pieces
//!
//! - [`WorkflowStage`] / [`StageName`] - one stage and its lifecycle
//! - [`WorkflowRecord`] - the persisted per-startup record of stage flags
//! - [`WorkflowController`] - status, generation and completion against the backend
//! - [`StageActions`] - button gating for a stage card

mod controller;
mod gating;
mod record;
mod stage;

pub use controller::{ArtifactRef, StatusOutcome, WorkflowController};
pub use gating::{ActionButton, StageActions};
pub use record::WorkflowRecord;
pub use stage::{StageName, StageState, WorkflowStage};
