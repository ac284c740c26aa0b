//! Export of a finished composition through the media engine.

use std::path::PathBuf;

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_project_model::composition::Composition;
use framecut_project_model::export::ExportParams;
use serde::{Deserialize, Serialize};

use crate::engine::{MediaEngine, RenderJob, RenderStatus, Storage};

/// Progress callback for export.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    ApplyingEdits,
    Preparing,
    Rendering,
    Complete,
    Failed,
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOutcome {
    /// File the engine wrote.
    pub output: PathBuf,

    /// Exported duration.
    pub duration: MediaTime,

    /// Engine that rendered the output.
    pub engine: String,

    /// Completion time (RFC 3339).
    pub finished_at: String,
}

fn report(progress: Option<&ProgressCallback>, stage: ExportStage, value: f64) {
    if let Some(cb) = progress {
        cb(ExportProgress {
            progress: value,
            stage,
        });
    }
}

/// Render `composition` to `params.destination`.
///
/// The composition's instructions are closed over its video duration and
/// its final trim is copied into the parameters. Any file already at the
/// destination is removed first; if rendering fails the destination is
/// removed again so no partial output remains.
pub async fn export_composition(
    composition: &mut Composition,
    params: &ExportParams,
    engine: &dyn MediaEngine,
    storage: &dyn Storage,
    progress: Option<&ProgressCallback>,
) -> EditResult<ExportOutcome> {
    params.validate()?;
    report(progress, ExportStage::Preparing, 0.0);

    composition.finalize_instructions();
    let mut params = params.clone();
    if let Some(range) = composition.crop_time_range {
        params.time_range = Some(range);
    }

    match storage.remove_if_exists(&params.destination).await {
        Ok(true) => {
            tracing::info!(path = %params.destination.display(), "Removed stale export");
        }
        Ok(false) => {}
        Err(err) => {
            report(progress, ExportStage::Failed, 0.0);
            tracing::error!(
                error = %err,
                path = %params.destination.display(),
                "Cannot clear export destination"
            );
            return Err(EditError::export(format!(
                "cannot clear {}: {err}",
                params.destination.display()
            )));
        }
    }

    tracing::info!(
        output = %params.destination.display(),
        engine = engine.name(),
        preset = params.preset.as_str(),
        fps = params.frame_rate.fps(),
        container = params.container.extension(),
        instructions = composition.instructions().len(),
        duration = %composition.duration(),
        "Starting export"
    );
    report(progress, ExportStage::Rendering, 0.1);

    let job = RenderJob::new(composition, &params);
    let rendered = engine.render(&job).await.and_then(|outcome| {
        if outcome.status == RenderStatus::Completed {
            Ok(outcome)
        } else {
            Err(EditError::export(format!(
                "media engine reported {:?}: {}",
                outcome.status,
                outcome.message.as_deref().unwrap_or("no detail")
            )))
        }
    });

    let outcome = match rendered {
        Ok(outcome) => outcome,
        Err(err) => {
            report(progress, ExportStage::Failed, 1.0);
            if let Err(cleanup) = storage.remove_if_exists(&params.destination).await {
                tracing::warn!(
                    error = %cleanup,
                    path = %params.destination.display(),
                    "Failed to remove partial export"
                );
            }
            tracing::error!(error = %err, "Export failed");
            return Err(match err {
                EditError::Export { .. } => err,
                other => EditError::export(other.to_string()),
            });
        }
    };

    let output = outcome.output.unwrap_or_else(|| params.destination.clone());
    let duration = params
        .time_range
        .map(|r| r.duration)
        .unwrap_or_else(|| composition.duration());
    report(progress, ExportStage::Complete, 1.0);
    tracing::info!(output = %output.display(), duration = %duration, "Export complete");

    Ok(ExportOutcome {
        output,
        duration,
        engine: engine.name().to_string(),
        finished_at: chrono::Utc::now().to_rfc3339(),
    })
}
