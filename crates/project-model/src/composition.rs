//! The working composition that edit commands mutate.
//!
//! A composition is created once from the loaded source, mutated only while
//! the command queue drains, and read once when exporting.

use framecut_common::{EditError, EditResult, MediaTime};
use kurbo::Size;
use serde::{Deserialize, Serialize};

use crate::geometry::{is_drawable, SourceOrientation};
use crate::instruction::{GeometryState, Instruction};
use crate::layer::OverlayLayout;
use crate::mix::MixDescriptor;
use crate::timeline::{CompositionTrack, TimeRange, Timeline, TrackId, TrackKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub timeline: Timeline,

    /// Primary video track.
    pub video_track: TrackId,

    /// Audio carried by the source video, if it had any.
    pub audio_track: Option<TrackId>,

    /// Natural size of the source video frames.
    pub natural_size: Size,

    /// Render size, open instruction, and pending orientation.
    pub geometry: GeometryState,

    /// Final range handed to the exporter.
    pub crop_time_range: Option<TimeRange>,

    pub mix: Option<MixDescriptor>,

    pub overlay: Option<OverlayLayout>,
}

impl Composition {
    /// Wrap a loaded timeline. The render size starts at the natural size
    /// and the orientation comes from the video track's preferred transform.
    pub fn new(
        timeline: Timeline,
        video_track: TrackId,
        audio_track: Option<TrackId>,
        natural_size: Size,
    ) -> EditResult<Self> {
        let video = timeline
            .track(video_track)
            .ok_or_else(|| EditError::missing_track(TrackKind::Video))?;
        if video.duration().is_zero() {
            return Err(EditError::range("empty composition: video track has no duration"));
        }
        if !is_drawable(natural_size) {
            return Err(EditError::source_load(format!(
                "invalid natural size {}x{}",
                natural_size.width, natural_size.height
            )));
        }
        let orientation = SourceOrientation::from_preferred_transform(&video.preferred_transform);

        Ok(Self {
            timeline,
            video_track,
            audio_track,
            natural_size,
            geometry: GeometryState::new(natural_size, orientation),
            crop_time_range: None,
            mix: None,
            overlay: None,
        })
    }

    pub fn duration(&self) -> MediaTime {
        self.timeline.duration()
    }

    pub fn video_duration(&self) -> MediaTime {
        self.timeline
            .track(self.video_track)
            .map(CompositionTrack::duration)
            .unwrap_or(MediaTime::ZERO)
    }

    pub fn render_size(&self) -> Size {
        self.geometry.render_size
    }

    pub fn video(&self) -> Option<&CompositionTrack> {
        self.timeline.track(self.video_track)
    }

    pub fn audio(&self) -> Option<&CompositionTrack> {
        self.audio_track.and_then(|id| self.timeline.track(id))
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.geometry.instructions.as_slice()
    }

    /// Close the instruction sequence over the current video duration.
    pub fn finalize_instructions(&mut self) {
        let duration = self.video_duration();
        self.geometry
            .instructions
            .finalize(self.video_track, duration);
    }
}
