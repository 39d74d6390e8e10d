//! Stage controller: status, generation and completion for workflow stages.
//!
//! The controller keeps an in-memory view of every stage it has touched.
//! Storage only changes a stage's completion flag through
//! [`WorkflowController::complete_stage`], so after a regeneration the view
//! holds completion at `false` until the stage is completed again, even if
//! storage still says it is done.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use super::gating::StageActions;
use super::record::WorkflowRecord;
use super::stage::{StageName, WorkflowStage};
use crate::documents::DocumentRecord;
use crate::error::{CoreError, CoreResult};
use crate::integrations::{ArtifactGenerator, Backend, DocumentStore, WorkflowStore};

type StageKey = (String, StageName);

fn key(startup_id: &str, stage: StageName) -> StageKey {
    (startup_id.to_string(), stage)
}

/// A generated stage artifact.
#[derive(Debug)]
pub struct ArtifactRef {
    pub startup_id: String,
    pub stage: StageName,
    /// Document type the artifact was stored under
    pub document_type: String,
    /// Backend status message
    pub message: Option<String>,
    /// The new document, when the backend returned a usable one
    pub document: Option<DocumentRecord>,
    /// Problems with the reply that did not fail the generation
    pub warnings: Vec<CoreError>,
}

/// Status lookup that never fails outright.
#[derive(Debug)]
pub struct StatusOutcome {
    /// The fetched stage, or the default one if the fetch failed
    pub stage: WorkflowStage,
    /// Why the default was used
    pub error: Option<CoreError>,
}

#[derive(Debug, Clone)]
struct StageView {
    stage: WorkflowStage,
    /// Regenerated since the last successful completion
    awaiting_review: bool,
}

/// Marks a stage busy until dropped.
struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<StageKey>>,
    key: StageKey,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.lock().remove(&self.key);
    }
}

/// Drives workflow stages against the backend services.
pub struct WorkflowController {
    documents: Arc<dyn DocumentStore>,
    workflow: Arc<dyn WorkflowStore>,
    generator: Arc<dyn ArtifactGenerator>,
    views: Mutex<HashMap<StageKey, StageView>>,
    busy: Mutex<HashSet<StageKey>>,
}

impl WorkflowController {
    /// Create a controller over explicit services.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        workflow: Arc<dyn WorkflowStore>,
        generator: Arc<dyn ArtifactGenerator>,
    ) -> Self {
        Self {
            documents,
            workflow,
            generator,
            views: Mutex::new(HashMap::new()),
            busy: Mutex::new(HashSet::new()),
        }
    }

    /// Create a controller over a backend bundle.
    pub fn from_backend(backend: &Backend) -> Self {
        Self::new(
            Arc::clone(&backend.documents),
            Arc::clone(&backend.workflow),
            Arc::clone(&backend.generator),
        )
    }

    /// The current view of a stage. Default if never fetched.
    pub fn view(&self, startup_id: &str, stage: StageName) -> WorkflowStage {
        self.views
            .lock()
            .get(&key(startup_id, stage))
            .map(|v| v.stage.clone())
            .unwrap_or_else(|| WorkflowStage::new(startup_id, stage))
    }

    /// Whether a generate or complete call is in flight for a stage.
    pub fn is_busy(&self, startup_id: &str, stage: StageName) -> bool {
        self.busy.lock().contains(&key(startup_id, stage))
    }

    /// Button state for a stage's current view.
    pub fn actions(&self, startup_id: &str, stage: StageName) -> StageActions {
        StageActions::for_stage(&self.view(startup_id, stage), self.is_busy(startup_id, stage))
    }

    /// Fetch a stage's status from storage.
    ///
    /// A startup without a workflow record gets the default stage. The
    /// artifact is considered present when document storage holds at least
    /// one document of the stage's artifact type.
    pub async fn get_status(&self, startup_id: &str, stage: StageName) -> CoreResult<WorkflowStage> {
        let record = self
            .workflow
            .fetch(startup_id)
            .await
            .map_err(|e| CoreError::upstream("workflow storage", &e))?;
        let stored_completed = record.as_ref().is_some_and(|r| r.stage_flag(stage));

        let artifact_exists = self.artifact_exists(startup_id, stage).await?;

        let mut views = self.views.lock();
        let view = views
            .entry(key(startup_id, stage))
            .or_insert_with(|| StageView { stage: WorkflowStage::new(startup_id, stage), awaiting_review: false });

        view.stage.artifact_exists = artifact_exists || view.awaiting_review;
        view.stage.completed = stored_completed && !view.awaiting_review;

        tracing::debug!(
            startup_id,
            stage = stage.key(),
            state = %view.stage.state(),
            "stage status refreshed"
        );
        Ok(view.stage.clone())
    }

    /// Fetch a stage's status, falling back to a not-completed view on failure.
    ///
    /// On failure the stored view loses its completion flag too, so `view`
    /// and `actions` agree with the returned stage. Artifact presence is kept.
    pub async fn status_or_default(&self, startup_id: &str, stage: StageName) -> StatusOutcome {
        match self.get_status(startup_id, stage).await {
            Ok(stage) => StatusOutcome { stage, error: None },
            Err(e) => {
                tracing::warn!(startup_id, stage = stage.key(), error = %e, "stage status unavailable");
                let fallback = self.update_view(startup_id, stage, |view| {
                    view.stage.completed = false;
                });
                StatusOutcome { stage: fallback, error: Some(e) }
            }
        }
    }

    /// Generate the stage's artifact.
    ///
    /// On success the stage view becomes generated and not completed. On
    /// failure the view is untouched. Never retried.
    pub async fn generate_artifact(&self, startup_id: &str, stage: StageName) -> CoreResult<ArtifactRef> {
        let _busy = self.begin(startup_id, stage)?;
        let document_type = stage.artifact_type();

        let receipt = self.generator.generate(startup_id, document_type).await.map_err(|e| {
            tracing::warn!(startup_id, stage = stage.key(), error = %e, "artifact generation failed");
            CoreError::upstream("artifact generation", &e)
        })?;

        self.update_view(startup_id, stage, |view| {
            view.stage.mark_generated();
            view.awaiting_review = true;
        });
        tracing::info!(startup_id, stage = stage.key(), "artifact generated");

        let mut warnings = Vec::new();
        let document = match receipt.document.map(DocumentRecord::try_from).transpose() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(startup_id, error = %e, "generation reply carried an unusable document");
                warnings.push(e);
                None
            }
        };

        Ok(ArtifactRef {
            startup_id: startup_id.to_string(),
            stage,
            document_type: document_type.to_string(),
            message: receipt.message,
            document,
            warnings,
        })
    }

    /// Mark a stage complete in storage.
    ///
    /// Reads the whole workflow record, sets this stage's flag and writes the
    /// record back so sibling flags survive. Completing an already completed
    /// stage repeats the write and succeeds. A stage with no artifact cannot
    /// be completed.
    pub async fn complete_stage(&self, startup_id: &str, stage: StageName) -> CoreResult<()> {
        let _busy = self.begin(startup_id, stage)?;

        let mut record = self
            .workflow
            .fetch(startup_id)
            .await
            .map_err(|e| {
                CoreError::ConflictOrUpstreamError(format!("reading workflow for {startup_id}: {e}"))
            })?
            .unwrap_or_else(|| WorkflowRecord::new(startup_id));

        if record.startup_id.is_empty() {
            record.startup_id = startup_id.to_string();
        }

        if !self.can_complete(startup_id, stage, &record).await? {
            return Err(CoreError::InvalidInput(format!(
                "{} has no artifact for {startup_id}; generate it first",
                stage.label()
            )));
        }
        record.set_stage_flag(stage, true);

        self.workflow.update(&record).await.map_err(|e| {
            tracing::warn!(startup_id, stage = stage.key(), error = %e, "workflow update failed");
            CoreError::ConflictOrUpstreamError(format!("writing workflow for {startup_id}: {e}"))
        })?;

        self.update_view(startup_id, stage, |view| {
            view.stage.mark_completed();
            view.awaiting_review = false;
        });
        tracing::info!(startup_id, stage = stage.key(), "stage completed");

        Ok(())
    }

    /// Completed stages stay completable; otherwise an artifact must exist.
    async fn can_complete(
        &self,
        startup_id: &str,
        stage: StageName,
        record: &WorkflowRecord,
    ) -> CoreResult<bool> {
        let (awaiting_review, known_artifact) = self
            .views
            .lock()
            .get(&key(startup_id, stage))
            .map_or((false, false), |v| (v.awaiting_review, v.stage.artifact_exists));

        if (record.stage_flag(stage) && !awaiting_review) || known_artifact {
            return Ok(true);
        }

        self.artifact_exists(startup_id, stage).await.map_err(|e| {
            CoreError::ConflictOrUpstreamError(format!("checking artifact for {startup_id}: {e}"))
        })
    }

    async fn artifact_exists(&self, startup_id: &str, stage: StageName) -> CoreResult<bool> {
        let documents = self
            .documents
            .list_documents(startup_id)
            .await
            .map_err(|e| CoreError::upstream("document storage", &e))?;

        let wanted = stage.artifact_type();
        Ok(documents.iter().any(|doc| {
            doc.owner_type.as_deref().is_some_and(|t| t.trim().eq_ignore_ascii_case(wanted))
        }))
    }

    fn begin(&self, startup_id: &str, stage: StageName) -> CoreResult<BusyGuard<'_>> {
        let key = key(startup_id, stage);
        if !self.busy.lock().insert(key.clone()) {
            return Err(CoreError::InvalidInput(format!(
                "{} action already in progress for {startup_id}",
                stage.label()
            )));
        }
        Ok(BusyGuard { busy: &self.busy, key })
    }

    fn update_view(
        &self,
        startup_id: &str,
        stage: StageName,
        apply: impl FnOnce(&mut StageView),
    ) -> WorkflowStage {
        let mut views = self.views.lock();
        let view = views
            .entry(key(startup_id, stage))
            .or_insert_with(|| StageView { stage: WorkflowStage::new(startup_id, stage), awaiting_review: false });
        apply(view);
        view.stage.clone()
    }
}
