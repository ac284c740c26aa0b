//! Edit commands and their effects on a composition.
//!
//! Commands are a closed set: each variant is one user-requested edit and
//! [`Command::apply`] runs its effect through a single `match`. Effects may
//! await the media engine (an added audio source has to be inspected before
//! it can be inserted) but never run concurrently with one another.

use std::fmt;

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_processing_core::layers::layout_overlay;
use framecut_processing_core::mix::{compute_insertion_range, MixBuilder};
use framecut_processing_core::transform::GeometryOp;
use framecut_project_model::composition::Composition;
use framecut_project_model::geometry::{MirrorAxis, Rect, RotateDegree};
use framecut_project_model::layer::LayerRequest;
use framecut_project_model::timeline::{SourceRef, TimeRange, TrackKind};
use serde::{Deserialize, Serialize};

use crate::engine::MediaEngine;

/// Accepted range for [`Command::ScaleTime`] factors.
pub const SCALE_FACTOR_RANGE: std::ops::RangeInclusive<f64> = 0.1..=8.0;

/// Variant tag used by the queue's ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Rotate,
    Crop,
    Mirror,
    Trim,
    ScaleTime,
    AddAudio,
    SetVolume,
    AddLayer,
}

impl CommandKind {
    /// Trims run after every other command.
    pub fn runs_last(self) -> bool {
        matches!(self, CommandKind::Trim)
    }

    pub fn is_geometric(self) -> bool {
        matches!(
            self,
            CommandKind::Rotate | CommandKind::Crop | CommandKind::Mirror
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Rotate => "rotate",
            CommandKind::Crop => "crop",
            CommandKind::Mirror => "mirror",
            CommandKind::Trim => "trim",
            CommandKind::ScaleTime => "scale_time",
            CommandKind::AddAudio => "add_audio",
            CommandKind::SetVolume => "set_volume",
            CommandKind::AddLayer => "add_layer",
        };
        f.write_str(name)
    }
}

/// An audio source to lay under the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInsert {
    pub source: SourceRef,
    /// Composition time the added audio starts at.
    pub start: MediaTime,
    /// Upper bound on the inserted length.
    pub duration_limit: Option<MediaTime>,
    /// Level for the video's own audio; `None` leaves it as it is.
    #[serde(default)]
    pub video_level: Option<f32>,
    /// Level for the added audio.
    pub music_level: f32,
}

impl AudioInsert {
    /// Insert `source` from the start at full volume, unbounded. The
    /// video's own level is left untouched.
    pub fn new(source: impl Into<SourceRef>) -> Self {
        Self {
            source: source.into(),
            start: MediaTime::ZERO,
            duration_limit: None,
            video_level: None,
            music_level: 1.0,
        }
    }

    pub fn starting_at(mut self, start: MediaTime) -> Self {
        self.start = start;
        self
    }

    pub fn limited_to(mut self, limit: MediaTime) -> Self {
        self.duration_limit = Some(limit);
        self
    }

    pub fn with_levels(mut self, video_level: f32, music_level: f32) -> Self {
        self.video_level = Some(video_level);
        self.music_level = music_level;
        self
    }
}

/// One queued edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Rotate { degree: RotateDegree },
    Crop { rect: Rect },
    Mirror { axis: MirrorAxis },
    /// Keep `[start, end)` of the assembled composition.
    Trim { start: MediaTime, end: MediaTime },
    /// Play `factor` times faster (`2.0` halves the duration).
    ScaleTime { factor: f64 },
    AddAudio(AudioInsert),
    SetVolume { level: f32 },
    AddLayer(LayerRequest),
}

/// What a command's effect may touch.
pub struct EditContext<'a> {
    pub composition: &'a mut Composition,
    pub engine: &'a dyn MediaEngine,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Rotate { .. } => CommandKind::Rotate,
            Command::Crop { .. } => CommandKind::Crop,
            Command::Mirror { .. } => CommandKind::Mirror,
            Command::Trim { .. } => CommandKind::Trim,
            Command::ScaleTime { .. } => CommandKind::ScaleTime,
            Command::AddAudio(_) => CommandKind::AddAudio,
            Command::SetVolume { .. } => CommandKind::SetVolume,
            Command::AddLayer(_) => CommandKind::AddLayer,
        }
    }

    /// The geometric edit this command performs, if it is one.
    pub fn geometry_op(&self) -> Option<GeometryOp> {
        match *self {
            Command::Rotate { degree } => Some(GeometryOp::Rotate(degree)),
            Command::Crop { rect } => Some(GeometryOp::Crop(rect)),
            Command::Mirror { axis } => Some(GeometryOp::Mirror(axis)),
            _ => None,
        }
    }

    /// Run this command's effect.
    pub async fn apply(&self, ctx: &mut EditContext<'_>) -> EditResult<()> {
        let composition = &mut *ctx.composition;
        match self {
            Command::Rotate { .. } | Command::Crop { .. } | Command::Mirror { .. } => {
                let op = self
                    .geometry_op()
                    .ok_or_else(|| EditError::transform_state("not a geometric command"))?;
                let duration = composition.video_duration();
                let track = composition.video_track;
                op.apply_to(&mut composition.geometry, track, duration)
            }
            Command::Trim { start, end } => trim(composition, *start, *end),
            Command::ScaleTime { factor } => scale_time(composition, *factor),
            Command::AddAudio(insert) => add_audio(composition, ctx.engine, insert).await,
            Command::SetVolume { level } => set_volume(composition, *level),
            Command::AddLayer(request) => add_layer(composition, request),
        }
    }
}

fn trim(composition: &mut Composition, start: MediaTime, end: MediaTime) -> EditResult<()> {
    let range = TimeRange::from_bounds(start, end)?;
    if range.is_empty() {
        return Err(EditError::range(format!("trim range {range} is empty")));
    }
    let kept = composition.timeline.trim(range)?;
    composition.crop_time_range = Some(TimeRange::new(MediaTime::ZERO, kept.duration));
    tracing::info!(
        kept = %kept,
        duration = %composition.duration(),
        "Trimmed composition"
    );
    Ok(())
}

fn scale_time(composition: &mut Composition, factor: f64) -> EditResult<()> {
    if !SCALE_FACTOR_RANGE.contains(&factor) {
        return Err(EditError::range(format!(
            "time scale factor {factor} outside {}..={}",
            SCALE_FACTOR_RANGE.start(),
            SCALE_FACTOR_RANGE.end()
        )));
    }
    let video_duration = composition.video_duration();
    if video_duration.is_zero() {
        return Err(EditError::range("cannot scale an empty video track"));
    }

    let range = TimeRange::new(MediaTime::ZERO, video_duration);
    let scaled = video_duration.mul_f64(1.0 / factor);
    let ids: Vec<_> = composition
        .timeline
        .tracks()
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.id)
        .collect();
    for id in ids {
        composition.timeline.rescale_track(id, range, scaled)?;
    }

    tracing::info!(
        factor,
        from = %video_duration,
        to = %composition.video_duration(),
        "Scaled composition time"
    );
    Ok(())
}

async fn add_audio(
    composition: &mut Composition,
    engine: &dyn MediaEngine,
    insert: &AudioInsert,
) -> EditResult<()> {
    let handle = engine
        .load_tracks(&insert.source, TrackKind::Audio)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            EditError::source_load(format!(
                "{} has no audio track",
                insert.source.path().display()
            ))
        })?;
    let source_duration = engine.load_duration(&insert.source).await?;

    let length = compute_insertion_range(
        composition.video_duration(),
        source_duration,
        insert.start,
        insert.duration_limit,
    )?;
    if length.is_zero() {
        tracing::warn!(
            source = %insert.source.path().display(),
            start = %insert.start,
            "Added audio has nothing to insert, skipping"
        );
        return Ok(());
    }

    let track = composition.timeline.add_track(TrackKind::Audio);
    composition.timeline.insert_into(
        track,
        &handle,
        TimeRange::new(MediaTime::ZERO, length),
        insert.start,
    )?;

    let mut mix = composition
        .mix
        .as_ref()
        .map(MixBuilder::from_descriptor)
        .unwrap_or_default();
    if let (Some(original), Some(level)) = (composition.audio_track, insert.video_level) {
        mix.add_source(original, level);
    }
    mix.add_source(track, insert.music_level);
    composition.mix = Some(mix.build());

    tracing::info!(
        source = %insert.source.path().display(),
        track = %track,
        start = %insert.start,
        length = %length,
        "Inserted audio track"
    );
    Ok(())
}

fn set_volume(composition: &mut Composition, level: f32) -> EditResult<()> {
    let track = composition
        .audio_track
        .ok_or_else(|| EditError::missing_track(TrackKind::Audio))?;
    let mut mix = composition
        .mix
        .as_ref()
        .map(MixBuilder::from_descriptor)
        .unwrap_or_default();
    mix.add_source(track, level);
    composition.mix = Some(mix.build());
    tracing::debug!(track = %track, level, "Set source volume");
    Ok(())
}

fn add_layer(composition: &mut Composition, request: &LayerRequest) -> EditResult<()> {
    let layout = layout_overlay(
        composition.render_size(),
        composition.video_duration(),
        request,
    )?;
    if composition.overlay.is_some() {
        tracing::debug!("Replacing earlier overlay layout");
    }
    tracing::debug!(texts = layout.texts.len(), "Laid out overlay");
    composition.overlay = Some(layout);
    Ok(())
}
