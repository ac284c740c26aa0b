//! Timeline model: composition tracks built from time-ranged segments.
//!
//! A composition track is an ordered list of [`Segment`]s. Each segment maps
//! a range of a source track onto a target range of the composition; when
//! the two durations differ the segment plays faster or slower than the
//! source. Durations are always derived from the segments, never cached, so
//! every consumer that asks for [`Timeline::current_duration`] sees the
//! effect of earlier inserts, rescales and trims.

use std::fmt;
use std::path::{Path, PathBuf};

use framecut_common::{EditError, EditResult, MediaTime};
use kurbo::Affine;
use serde::{Deserialize, Serialize};

/// Media type of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Video => f.write_str("video"),
            TrackKind::Audio => f.write_str("audio"),
        }
    }
}

/// Identity of a composition track. Unique within one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a media source the engine can open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub path: PathBuf,
}

impl SourceRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        Self { path }
    }
}

impl From<&Path> for SourceRef {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for SourceRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// One track inside a source, as reported by the media engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackHandle {
    pub source: SourceRef,
    pub kind: TrackKind,
    /// Position of the track among the source's tracks of the same kind.
    pub index: usize,
}

/// Half-open time range `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: MediaTime,
    pub duration: MediaTime,
}

impl TimeRange {
    pub const fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// Range from `start` to `end`. Fails when `end` precedes `start`.
    pub fn from_bounds(start: MediaTime, end: MediaTime) -> EditResult<Self> {
        let duration = end.checked_sub(start).ok_or_else(|| {
            EditError::range(format!("range end {end} precedes its start {start}"))
        })?;
        Ok(Self { start, duration })
    }

    pub fn end(&self) -> MediaTime {
        self.start + self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.duration.is_zero()
    }

    pub fn contains(&self, t: MediaTime) -> bool {
        t >= self.start && t < self.end()
    }

    /// Overlap of two ranges, `None` when they do not overlap.
    pub fn intersection(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        if end > start {
            Some(TimeRange::new(start, end.saturating_sub(start)))
        } else {
            None
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// A source range placed on the composition timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub source_track: TrackHandle,
    /// Range read from the source track.
    pub source_range: TimeRange,
    /// Range occupied in the composition.
    pub target: TimeRange,
}

impl Segment {
    /// Source seconds consumed per composition second.
    pub fn speed(&self) -> f64 {
        self.source_range
            .duration
            .ratio(self.target.duration)
            .unwrap_or(1.0)
    }

    /// Split at composition time `at`, which must fall strictly inside
    /// the target range.
    fn split_at(&self, at: MediaTime) -> (Segment, Segment) {
        let offset = at.saturating_sub(self.target.start);
        let source_offset = offset
            .mul_f64(self.speed())
            .min(self.source_range.duration);

        let left = Segment {
            source_track: self.source_track.clone(),
            source_range: TimeRange::new(self.source_range.start, source_offset),
            target: TimeRange::new(self.target.start, offset),
        };
        let right = Segment {
            source_track: self.source_track.clone(),
            source_range: TimeRange::new(
                self.source_range.start + source_offset,
                self.source_range.duration.saturating_sub(source_offset),
            ),
            target: TimeRange::new(at, self.target.duration.saturating_sub(offset)),
        };
        (left, right)
    }
}

/// A composition track of one media kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionTrack {
    pub id: TrackId,
    pub kind: TrackKind,
    /// Segments ordered by target start; targets never overlap.
    pub segments: Vec<Segment>,
    /// Cumulative playback speed applied by rescales (1.0 = source speed).
    pub time_scale: f64,
    /// Orientation transform carried over from the source track.
    pub preferred_transform: Affine,
}

impl CompositionTrack {
    pub fn new(id: TrackId, kind: TrackKind) -> Self {
        Self {
            id,
            kind,
            segments: Vec::new(),
            time_scale: 1.0,
            preferred_transform: Affine::IDENTITY,
        }
    }

    /// Total inserted duration: the end of the last segment.
    pub fn duration(&self) -> MediaTime {
        self.segments
            .iter()
            .map(|s| s.target.end())
            .max()
            .unwrap_or(MediaTime::ZERO)
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(MediaTime::ZERO, self.duration())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split whichever segment strictly contains `at`.
    fn split_at(&mut self, at: MediaTime) {
        let Some(idx) = self
            .segments
            .iter()
            .position(|s| s.target.start < at && at < s.target.end())
        else {
            return;
        };
        let (left, right) = self.segments[idx].split_at(at);
        self.segments[idx] = left;
        self.segments.insert(idx + 1, right);
    }

    fn insert(
        &mut self,
        source_track: &TrackHandle,
        source_range: TimeRange,
        at: MediaTime,
    ) -> EditResult<()> {
        if source_range.is_empty() {
            return Err(EditError::range(format!(
                "cannot insert empty range {source_range} into {} track {}",
                self.kind, self.id
            )));
        }

        self.split_at(at);
        for segment in &mut self.segments {
            if segment.target.start >= at {
                segment.target.start += source_range.duration;
            }
        }
        self.segments.push(Segment {
            source_track: source_track.clone(),
            source_range,
            target: TimeRange::new(at, source_range.duration),
        });
        self.segments.sort_by_key(|s| s.target.start);
        Ok(())
    }

    fn rescale(&mut self, range: TimeRange, to_duration: MediaTime) -> EditResult<()> {
        if range.is_empty() {
            return Err(EditError::range(format!(
                "cannot rescale empty range {range} on {} track {}",
                self.kind, self.id
            )));
        }
        let Some(speed_change) = range.duration.ratio(to_duration) else {
            return Err(EditError::range(format!(
                "cannot rescale {range} to zero duration"
            )));
        };

        self.split_at(range.start);
        self.split_at(range.end());

        let factor = 1.0 / speed_change;
        let map = |t: MediaTime| -> MediaTime {
            if t <= range.start {
                t
            } else if t >= range.end() {
                (t.saturating_sub(range.duration)) + to_duration
            } else {
                range.start + t.saturating_sub(range.start).mul_f64(factor)
            }
        };

        for segment in &mut self.segments {
            let start = map(segment.target.start);
            let end = map(segment.target.end());
            segment.target = TimeRange::new(start, end.saturating_sub(start));
        }
        self.segments.retain(|s| !s.target.is_empty());
        self.time_scale *= speed_change;
        Ok(())
    }

    /// Keep only content inside `range` and move it to start at zero.
    fn retain_range(&mut self, range: TimeRange) {
        self.split_at(range.start);
        self.split_at(range.end());
        self.segments
            .retain(|s| s.target.start >= range.start && s.target.end() <= range.end());
        for segment in &mut self.segments {
            segment.target.start = segment.target.start.saturating_sub(range.start);
        }
    }
}

/// The set of composition tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    tracks: Vec<CompositionTrack>,
    next_id: u32,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty composition track and return its identity.
    pub fn add_track(&mut self, kind: TrackKind) -> TrackId {
        self.next_id += 1;
        let id = TrackId(self.next_id);
        self.tracks.push(CompositionTrack::new(id, kind));
        id
    }

    pub fn tracks(&self) -> &[CompositionTrack] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut CompositionTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// The first track created for `kind`.
    pub fn primary(&self, kind: TrackKind) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Insert `at_time_range` of `source_track` into the primary track of
    /// `kind` at composition time `at_position`. Content at or after the
    /// position moves right by the inserted duration.
    pub fn insert_track(
        &mut self,
        kind: TrackKind,
        source_track: &TrackHandle,
        at_time_range: TimeRange,
        at_position: MediaTime,
    ) -> EditResult<()> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.kind == kind)
            .ok_or_else(|| EditError::track_insert(kind))?;
        track.insert(source_track, at_time_range, at_position)
    }

    /// Same as [`Timeline::insert_track`] but targets a specific track.
    pub fn insert_into(
        &mut self,
        id: TrackId,
        source_track: &TrackHandle,
        at_time_range: TimeRange,
        at_position: MediaTime,
    ) -> EditResult<()> {
        let track = self
            .track_mut(id)
            .ok_or_else(|| EditError::track_insert(format!("{} ({id})", source_track.kind)))?;
        track.insert(source_track, at_time_range, at_position)
    }

    /// Total inserted duration of the primary track of `kind`.
    pub fn current_duration(&self, kind: TrackKind) -> MediaTime {
        self.primary(kind)
            .map(CompositionTrack::duration)
            .unwrap_or(MediaTime::ZERO)
    }

    /// Composition duration: the longest track.
    pub fn duration(&self) -> MediaTime {
        self.tracks
            .iter()
            .map(CompositionTrack::duration)
            .max()
            .unwrap_or(MediaTime::ZERO)
    }

    /// Stretch or compress `range` of the primary track of `kind` to
    /// `to_duration`, keeping the source mapping.
    pub fn rescale_time_range(
        &mut self,
        kind: TrackKind,
        range: TimeRange,
        to_duration: MediaTime,
    ) -> EditResult<()> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.kind == kind)
            .ok_or_else(|| EditError::missing_track(kind))?;
        track.rescale(range, to_duration)
    }

    pub fn rescale_track(
        &mut self,
        id: TrackId,
        range: TimeRange,
        to_duration: MediaTime,
    ) -> EditResult<()> {
        let track = self
            .track_mut(id)
            .ok_or_else(|| EditError::missing_track(id))?;
        track.rescale(range, to_duration)
    }

    /// Keep only `range` on every track, rebased to start at zero.
    ///
    /// A range reaching past the end of the composition is clamped to it.
    /// Returns the range that was actually kept, in pre-trim coordinates.
    pub fn trim(&mut self, range: TimeRange) -> EditResult<TimeRange> {
        let total = TimeRange::new(MediaTime::ZERO, self.duration());
        let kept = range.intersection(&total).ok_or_else(|| {
            EditError::range(format!(
                "trim range {range} does not overlap composition {total}"
            ))
        })?;
        if kept != range {
            tracing::warn!(requested = %range, kept = %kept, "Trim range clamped to composition");
        }
        for track in &mut self.tracks {
            track.retain_range(kept);
        }
        Ok(kept)
    }
}
