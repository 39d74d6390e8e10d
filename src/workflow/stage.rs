//! Workflow stages and their generate/complete lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A named step in a startup's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Evaluation,
    MarketResearch,
    Recommendation,
    Mvp,
    PitchDeck,
}

impl StageName {
    /// Every stage, in workflow order.
    pub const ALL: [Self; 5] =
        [Self::Evaluation, Self::MarketResearch, Self::Recommendation, Self::Mvp, Self::PitchDeck];

    /// Field name of this stage's flag in the workflow record.
    pub fn key(self) -> &'static str {
        match self {
            Self::Evaluation => "evaluation",
            Self::MarketResearch => "market_research",
            Self::Recommendation => "recommendation",
            Self::Mvp => "mvp",
            Self::PitchDeck => "pitch_deck",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Evaluation => "Evaluation",
            Self::MarketResearch => "Market Research",
            Self::Recommendation => "Recommendation",
            Self::Mvp => "MVP",
            Self::PitchDeck => "Pitch Deck",
        }
    }

    /// Document type of the artifact this stage generates.
    pub fn artifact_type(self) -> &'static str {
        match self {
            Self::Evaluation => "Evaluation Report",
            Self::MarketResearch => "Market Research",
            Self::Recommendation => "Recommendation Report",
            Self::Mvp => "MVP Plan",
            Self::PitchDeck => "Pitch Deck",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StageName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.key() == wanted || stage.label().to_lowercase().replace(' ', "_") == wanted)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown stage: {}", s.trim())))
    }
}

/// Where a stage is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageState {
    /// No artifact yet
    NotGenerated,
    /// Artifact exists, awaiting review
    Generated,
    /// Marked done by the founder
    Completed,
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotGenerated => write!(f, "not generated"),
            Self::Generated => write!(f, "generated"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One stage of one startup's workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStage {
    pub startup_id: String,
    pub stage: StageName,
    pub artifact_exists: bool,
    pub completed: bool,
}

impl WorkflowStage {
    /// A stage that has never been generated or completed.
    pub fn new(startup_id: impl Into<String>, stage: StageName) -> Self {
        Self { startup_id: startup_id.into(), stage, artifact_exists: false, completed: false }
    }

    /// Current lifecycle state.
    ///
    /// The completion flag wins: a stage marked done is `Completed` even if
    /// its artifact has since disappeared from storage.
    pub fn state(&self) -> StageState {
        if self.completed {
            StageState::Completed
        } else if self.artifact_exists {
            StageState::Generated
        } else {
            StageState::NotGenerated
        }
    }

    /// Apply a successful (re)generation. Always clears completion.
    pub fn mark_generated(&mut self) {
        self.artifact_exists = true;
        self.completed = false;
    }

    /// Apply a successful completion.
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_not_generated() {
        let stage = WorkflowStage::new("s1", StageName::Evaluation);
        assert_eq!(stage.state(), StageState::NotGenerated);
        assert!(!stage.completed);
    }

    #[test]
    fn test_lifecycle() {
        let mut stage = WorkflowStage::new("s1", StageName::Evaluation);

        stage.mark_generated();
        assert_eq!(stage.state(), StageState::Generated);

        stage.mark_completed();
        assert_eq!(stage.state(), StageState::Completed);

        // Regenerating a completed stage sends it back for review.
        stage.mark_generated();
        assert_eq!(stage.state(), StageState::Generated);
        assert!(!stage.completed);
    }

    #[test]
    fn test_regenerate_from_generated_stays_generated() {
        let mut stage = WorkflowStage::new("s1", StageName::MarketResearch);
        stage.mark_generated();
        stage.mark_generated();
        assert_eq!(stage.state(), StageState::Generated);
    }

    #[test]
    fn test_completed_without_artifact() {
        let stage = WorkflowStage {
            startup_id: "s1".to_string(),
            stage: StageName::Mvp,
            artifact_exists: false,
            completed: true,
        };
        assert_eq!(stage.state(), StageState::Completed);
    }

    #[test]
    fn test_stage_name_parsing() {
        assert_eq!("evaluation".parse::<StageName>().unwrap(), StageName::Evaluation);
        assert_eq!("market-research".parse::<StageName>().unwrap(), StageName::MarketResearch);
        assert_eq!("Market Research".parse::<StageName>().unwrap(), StageName::MarketResearch);
        assert_eq!("PITCH_DECK".parse::<StageName>().unwrap(), StageName::PitchDeck);
        assert_eq!("MVP".parse::<StageName>().unwrap(), StageName::Mvp);
        assert!("funding".parse::<StageName>().is_err());
    }

    #[test]
    fn test_stage_name_serde_uses_key() {
        for stage in StageName::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.key()));
        }
    }
}
