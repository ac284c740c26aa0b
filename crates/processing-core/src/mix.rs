//! Audio mix building and insertion-length arithmetic.

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_project_model::mix::{MixDescriptor, MixInput, VolumeCurve};
use framecut_project_model::timeline::TrackId;

/// Accumulates one flat level per track.
///
/// Adding a track twice overwrites its level in place, so the resulting
/// descriptor never lists a track more than once.
#[derive(Debug, Clone, Default)]
pub struct MixBuilder {
    levels: Vec<(TrackId, f32)>,
}

impl MixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder with the levels already in `descriptor`.
    pub fn from_descriptor(descriptor: &MixDescriptor) -> Self {
        let levels = descriptor
            .inputs()
            .iter()
            .map(|input| (input.track, input.volume.level_at(MediaTime::ZERO)))
            .collect();
        Self { levels }
    }

    /// Set `track`'s level, clamped to `[0.0, 1.0]`.
    pub fn add_source(&mut self, track: TrackId, level: f32) -> &mut Self {
        let clamped = clamp_level(level);
        if clamped != level {
            tracing::warn!(track = %track, requested = level, used = clamped, "Mix level clamped");
        }
        match self.levels.iter_mut().find(|(id, _)| *id == track) {
            Some(entry) => entry.1 = clamped,
            None => self.levels.push((track, clamped)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn build(&self) -> MixDescriptor {
        MixDescriptor::from_inputs(self.levels.iter().map(|&(track, level)| MixInput {
            track,
            volume: VolumeCurve::flat(level),
        }))
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Length of an inserted audio range.
///
/// `min(video - start, source, limit)`. Fails when `start` lies past the
/// end of the video.
pub fn compute_insertion_range(
    video_duration: MediaTime,
    source_duration: MediaTime,
    start_offset: MediaTime,
    duration_limit: Option<MediaTime>,
) -> EditResult<MediaTime> {
    let available = video_duration.checked_sub(start_offset).ok_or_else(|| {
        EditError::range(format!(
            "added track starts at {start_offset}, after the video ends at {video_duration}"
        ))
    })?;
    Ok(available
        .min(source_duration)
        .min(duration_limit.unwrap_or(MediaTime::MAX)))
}
