//! In-memory media engine and storage for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_project_model::composition::Composition;
use framecut_project_model::export::ExportParams;
use framecut_project_model::geometry::{Affine, Size};
use framecut_project_model::timeline::{SourceRef, TrackHandle, TrackKind};
use framecut_render_engine::{MediaEngine, RenderJob, RenderOutcome, Storage};

#[derive(Debug, Clone)]
pub struct FakeSource {
    pub duration: MediaTime,
    pub size: Size,
    pub preferred_transform: Affine,
    pub video: bool,
    pub audio: bool,
}

impl FakeSource {
    pub fn video(secs: u64) -> Self {
        Self {
            duration: MediaTime::from_secs(secs),
            size: Size::new(1920.0, 1080.0),
            preferred_transform: Affine::IDENTITY,
            video: true,
            audio: true,
        }
    }

    pub fn music(secs: u64) -> Self {
        Self {
            duration: MediaTime::from_secs(secs),
            size: Size::ZERO,
            preferred_transform: Affine::IDENTITY,
            video: false,
            audio: true,
        }
    }

    pub fn silent(mut self) -> Self {
        self.audio = false;
        self
    }
}

/// What the engine saw when asked to render.
#[derive(Debug, Clone)]
pub struct RenderedJob {
    pub composition: Composition,
    pub params: ExportParams,
    pub destination_existed: bool,
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    sources: HashMap<PathBuf, FakeSource>,
    fail_render: Option<String>,
    rendered: Mutex<Vec<RenderedJob>>,
    storage: Option<std::sync::Arc<FakeStorage>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: &str, source: FakeSource) -> Self {
        self.sources.insert(PathBuf::from(path), source);
        self
    }

    pub fn failing_render(mut self, message: &str) -> Self {
        self.fail_render = Some(message.to_string());
        self
    }

    /// Let the engine write its output into `storage`.
    pub fn writing_to(mut self, storage: std::sync::Arc<FakeStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn rendered(&self) -> Vec<RenderedJob> {
        self.rendered.lock().unwrap().clone()
    }

    fn lookup(&self, source: &SourceRef) -> EditResult<&FakeSource> {
        self.sources.get(source.path()).ok_or_else(|| {
            EditError::source_load(format!("cannot open {}", source.path().display()))
        })
    }
}

#[async_trait::async_trait]
impl MediaEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn load_tracks(
        &self,
        source: &SourceRef,
        kind: TrackKind,
    ) -> EditResult<Vec<TrackHandle>> {
        let fake = self.lookup(source)?;
        let present = match kind {
            TrackKind::Video => fake.video,
            TrackKind::Audio => fake.audio,
        };
        Ok(if present {
            vec![TrackHandle {
                source: source.clone(),
                kind,
                index: 0,
            }]
        } else {
            Vec::new()
        })
    }

    async fn load_duration(&self, source: &SourceRef) -> EditResult<MediaTime> {
        Ok(self.lookup(source)?.duration)
    }

    async fn load_natural_size(&self, track: &TrackHandle) -> EditResult<Size> {
        Ok(self.lookup(&track.source)?.size)
    }

    async fn load_preferred_transform(&self, track: &TrackHandle) -> EditResult<Affine> {
        Ok(self.lookup(&track.source)?.preferred_transform)
    }

    async fn render(&self, job: &RenderJob<'_>) -> EditResult<RenderOutcome> {
        let destination_existed = match &self.storage {
            Some(storage) => storage.contains(job.destination()),
            None => false,
        };
        self.rendered.lock().unwrap().push(RenderedJob {
            composition: job.composition.clone(),
            params: job.params.clone(),
            destination_existed,
        });
        if let Some(storage) = &self.storage {
            // Partial output is written even when the render fails.
            storage.insert(job.destination());
        }
        match &self.fail_render {
            Some(message) => Ok(RenderOutcome::failed(message.clone())),
            None => Ok(RenderOutcome::completed(job.destination())),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeStorage {
    files: Mutex<HashSet<PathBuf>>,
    removed: Mutex<Vec<PathBuf>>,
    read_only: Mutex<HashSet<PathBuf>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &Path) {
        self.files.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains(path)
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }

    /// Make removing `path` fail with a permission error.
    pub fn protect(&self, path: &Path) {
        self.insert(path);
        self.read_only.lock().unwrap().insert(path.to_path_buf());
    }
}

#[async_trait::async_trait]
impl Storage for FakeStorage {
    async fn exists(&self, path: &Path) -> EditResult<bool> {
        Ok(self.contains(path))
    }

    async fn remove_if_exists(&self, path: &Path) -> EditResult<bool> {
        if self.read_only.lock().unwrap().contains(path) {
            return Err(EditError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only file",
            )));
        }
        let removed = self.files.lock().unwrap().remove(path);
        if removed {
            self.removed.lock().unwrap().push(path.to_path_buf());
        }
        Ok(removed)
    }
}

pub fn secs(s: u64) -> MediaTime {
    MediaTime::from_secs(s)
}
