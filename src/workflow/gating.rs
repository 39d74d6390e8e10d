//! Button state for a stage card.

use serde::Serialize;

use super::stage::{StageState, WorkflowStage};

/// A single action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub label: &'static str,
    pub enabled: bool,
}

/// The generate and complete buttons for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageActions {
    pub state: StageState,
    pub generate: ActionButton,
    pub complete: ActionButton,
    pub busy: bool,
}

impl StageActions {
    /// Gate the buttons for a stage view.
    ///
    /// While an action is in flight both buttons are disabled. Otherwise
    /// generate is always available and complete only for a generated,
    /// not yet completed stage.
    pub fn for_stage(stage: &WorkflowStage, busy: bool) -> Self {
        let state = stage.state();

        let generate = ActionButton {
            label: if state == StageState::NotGenerated { "Generate" } else { "Regenerate" },
            enabled: !busy,
        };

        let complete = ActionButton {
            label: if state == StageState::Completed { "Completed" } else { "Mark as complete" },
            enabled: !busy && state == StageState::Generated,
        };

        Self { state, generate, complete, busy }
    }
}
