//! Video editing session: the public entry point.
//!
//! Edit methods only enqueue commands. Nothing touches the composition
//! until [`VideoEditingSession::apply_pending`] or
//! [`VideoEditingSession::export`] drains the queue.

use std::sync::Arc;

use framecut_common::{AppConfig, EditError, EditResult, FailurePolicy, MediaTime};
use framecut_project_model::composition::Composition;
use framecut_project_model::export::ExportParams;
use framecut_project_model::geometry::{MirrorAxis, Rect, RotateDegree};
use framecut_project_model::layer::LayerRequest;
use framecut_project_model::timeline::SourceRef;

use crate::command::{AudioInsert, Command};
use crate::engine::{LocalStorage, MediaEngine, Storage};
use crate::export::{
    export_composition, ExportOutcome, ExportProgress, ExportStage, ProgressCallback,
};
use crate::queue::{CommandQueue, DrainReport};
use crate::source::{load_source, merge_sources};

/// State of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting edits.
    Editing,
    /// Draining commands and rendering.
    Exporting,
    /// Last export succeeded.
    Exported,
    /// Last export failed.
    Failed,
}

/// One editing pipeline over one working composition.
pub struct VideoEditingSession {
    composition: Composition,
    queue: CommandQueue,
    engine: Arc<dyn MediaEngine>,
    storage: Arc<dyn Storage>,
    policy: FailurePolicy,
    state: SessionState,
}

impl VideoEditingSession {
    /// Open a session over a single source.
    pub async fn open(
        engine: Arc<dyn MediaEngine>,
        source: impl Into<SourceRef>,
    ) -> EditResult<Self> {
        let source = source.into();
        let composition = load_source(engine.as_ref(), &source).await?;
        Ok(Self::with_composition(engine, composition))
    }

    /// Open a session over several sources played back to back.
    pub async fn open_merged(
        engine: Arc<dyn MediaEngine>,
        sources: &[SourceRef],
    ) -> EditResult<Self> {
        let composition = merge_sources(engine.as_ref(), sources).await?;
        Ok(Self::with_composition(engine, composition))
    }

    /// Wrap an already built composition.
    pub fn with_composition(engine: Arc<dyn MediaEngine>, composition: Composition) -> Self {
        Self {
            composition,
            queue: CommandQueue::new(),
            engine,
            storage: Arc::new(LocalStorage),
            policy: FailurePolicy::default(),
            state: SessionState::Editing,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply pipeline settings from `config`.
    pub fn with_config(self, config: &AppConfig) -> Self {
        self.with_failure_policy(config.pipeline.failure_policy)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn pending(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn rotate(&mut self, degree: RotateDegree) -> &mut Self {
        self.enqueue(Command::Rotate { degree })
    }

    pub fn crop(&mut self, rect: Rect) -> &mut Self {
        self.enqueue(Command::Crop { rect })
    }

    pub fn mirror(&mut self, axis: MirrorAxis) -> &mut Self {
        self.enqueue(Command::Mirror { axis })
    }

    /// Keep `[start, end)` of the finished timeline.
    pub fn crop_time(&mut self, start: MediaTime, end: MediaTime) -> &mut Self {
        self.enqueue(Command::Trim { start, end })
    }

    /// Speed playback up by `factor` (0.1 to 8.0).
    pub fn scale_time(&mut self, factor: f64) -> &mut Self {
        self.enqueue(Command::ScaleTime { factor })
    }

    pub fn add_layer(&mut self, request: LayerRequest) -> &mut Self {
        self.enqueue(Command::AddLayer(request))
    }

    pub fn add_audio(&mut self, insert: AudioInsert) -> &mut Self {
        self.enqueue(Command::AddAudio(insert))
    }

    /// Level of the source's own audio.
    pub fn set_volume(&mut self, level: f32) -> &mut Self {
        self.enqueue(Command::SetVolume { level })
    }

    pub fn enqueue(&mut self, command: Command) -> &mut Self {
        if self.state != SessionState::Editing {
            tracing::debug!(state = ?self.state, "Editing again after export");
            self.state = SessionState::Editing;
        }
        self.queue.enqueue(command);
        self
    }

    /// Drain the queue into the composition without exporting.
    pub async fn apply_pending(&mut self) -> EditResult<DrainReport> {
        self.queue
            .drain(&mut self.composition, self.engine.as_ref(), self.policy)
            .await
    }

    /// Apply every queued edit and render the result.
    pub async fn export(&mut self, params: &ExportParams) -> EditResult<ExportOutcome> {
        self.export_with_progress(params, None).await
    }

    pub async fn export_with_progress(
        &mut self,
        params: &ExportParams,
        progress: Option<ProgressCallback>,
    ) -> EditResult<ExportOutcome> {
        self.state = SessionState::Exporting;
        let result = self.run_export(params, progress.as_ref()).await;
        self.state = match result {
            Ok(_) => SessionState::Exported,
            Err(_) => SessionState::Failed,
        };
        result
    }

    async fn run_export(
        &mut self,
        params: &ExportParams,
        progress: Option<&ProgressCallback>,
    ) -> EditResult<ExportOutcome> {
        if let Some(cb) = progress {
            cb(ExportProgress {
                progress: 0.0,
                stage: ExportStage::ApplyingEdits,
            });
        }

        let drained = self.apply_pending().await?;
        if !drained.is_clean() {
            tracing::warn!(
                failed = drained.failures.len(),
                engine_failures = drained.engine_failures(),
                applied = drained.applied.len(),
                "Exporting with failed edits"
            );
        }
        if self.composition.video_duration().is_zero() {
            return Err(EditError::range("nothing to export: video track is empty"));
        }

        export_composition(
            &mut self.composition,
            params,
            self.engine.as_ref(),
            self.storage.as_ref(),
            progress,
        )
        .await
    }
}

impl std::fmt::Debug for VideoEditingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEditingSession")
            .field("engine", &self.engine.name())
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("pending", &self.queue.len())
            .field("duration", &self.composition.duration())
            .finish()
    }
}
