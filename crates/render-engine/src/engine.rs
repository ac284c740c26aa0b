//! Interfaces to the media engine and to storage.
//!
//! Decoding, compositing and encoding live behind [`MediaEngine`]; the
//! pipeline only asks it for source metadata and hands it a finished
//! composition to render.

use std::path::{Path, PathBuf};

use framecut_common::{EditResult, MediaTime};
use framecut_project_model::composition::Composition;
use framecut_project_model::export::ExportParams;
use framecut_project_model::geometry::{Affine, Size};
use framecut_project_model::instruction::Instruction;
use framecut_project_model::layer::OverlayLayout;
use framecut_project_model::mix::MixDescriptor;
use framecut_project_model::timeline::{SourceRef, TrackHandle, TrackKind};
use serde::{Deserialize, Serialize};

/// Everything the media engine needs to produce the output file.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub composition: &'a Composition,
    pub params: &'a ExportParams,
}

impl<'a> RenderJob<'a> {
    pub fn new(composition: &'a Composition, params: &'a ExportParams) -> Self {
        Self {
            composition,
            params,
        }
    }

    pub fn instructions(&self) -> &'a [Instruction] {
        self.composition.instructions()
    }

    pub fn mix(&self) -> Option<&'a MixDescriptor> {
        self.composition.mix.as_ref()
    }

    pub fn overlay(&self) -> Option<&'a OverlayLayout> {
        self.composition.overlay.as_ref()
    }

    pub fn render_size(&self) -> Size {
        self.composition.render_size()
    }

    pub fn frame_duration(&self) -> MediaTime {
        self.params.frame_rate.frame_duration()
    }

    pub fn destination(&self) -> &'a Path {
        &self.params.destination
    }
}

/// Final state reported by the media engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutcome {
    pub status: RenderStatus,
    /// Path the engine wrote, when it completed.
    pub output: Option<PathBuf>,
    /// Engine-provided detail for a non-completed status.
    pub message: Option<String>,
}

impl RenderOutcome {
    pub fn completed(output: impl Into<PathBuf>) -> Self {
        Self {
            status: RenderStatus::Completed,
            output: Some(output.into()),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: RenderStatus::Failed,
            output: None,
            message: Some(message.into()),
        }
    }
}

/// External decode/composite/encode service.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Tracks of `kind` in `source`, in source order. An empty list means
    /// the source has no such track.
    async fn load_tracks(&self, source: &SourceRef, kind: TrackKind)
        -> EditResult<Vec<TrackHandle>>;

    async fn load_duration(&self, source: &SourceRef) -> EditResult<MediaTime>;

    async fn load_natural_size(&self, track: &TrackHandle) -> EditResult<Size>;

    async fn load_preferred_transform(&self, track: &TrackHandle) -> EditResult<Affine>;

    /// Render and encode the job to its destination.
    async fn render(&self, job: &RenderJob<'_>) -> EditResult<RenderOutcome>;
}

/// Destination file housekeeping.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn exists(&self, path: &Path) -> EditResult<bool>;

    /// Remove `path` if present. Returns whether a file was removed.
    async fn remove_if_exists(&self, path: &Path) -> EditResult<bool>;
}

/// [`Storage`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[async_trait::async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, path: &Path) -> EditResult<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn remove_if_exists(&self, path: &Path) -> EditResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed existing file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
