//! Building the working composition from one or more sources.

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_project_model::composition::Composition;
use framecut_project_model::geometry::{Affine, Size};
use framecut_project_model::timeline::{SourceRef, TimeRange, Timeline, TrackHandle, TrackKind};

use crate::engine::MediaEngine;

/// Open a single source.
pub async fn load_source(engine: &dyn MediaEngine, source: &SourceRef) -> EditResult<Composition> {
    merge_sources(engine, std::slice::from_ref(source)).await
}

/// Concatenate `sources` into one composition.
///
/// Each source's first video track, and first audio track when it has one,
/// is appended at the running end of the sources before it. The render size
/// and orientation come from the first source; later sources are expected
/// to match it. Any load failure aborts with no partial composition.
pub async fn merge_sources(
    engine: &dyn MediaEngine,
    sources: &[SourceRef],
) -> EditResult<Composition> {
    let Some(first) = sources.first() else {
        return Err(EditError::range("no sources to open"));
    };

    let mut timeline = Timeline::new();
    let video_track = timeline.add_track(TrackKind::Video);
    let mut audio_track = None;
    let mut natural_size = Size::ZERO;
    let mut preferred_transform = Affine::IDENTITY;
    let mut cursor = MediaTime::ZERO;

    for (index, source) in sources.iter().enumerate() {
        let video = first_track(engine, source, TrackKind::Video)
            .await?
            .ok_or_else(|| {
                EditError::source_load(format!(
                    "{} has no video track",
                    source.path().display()
                ))
            })?;
        let audio = first_track(engine, source, TrackKind::Audio).await?;
        let duration = engine.load_duration(source).await?;
        if duration.is_zero() {
            return Err(EditError::source_load(format!(
                "{} has no duration",
                source.path().display()
            )));
        }

        if index == 0 {
            natural_size = engine.load_natural_size(&video).await?;
            preferred_transform = engine.load_preferred_transform(&video).await?;
        } else {
            let size = engine.load_natural_size(&video).await?;
            if size != natural_size {
                tracing::warn!(
                    source = %source.path().display(),
                    width = size.width,
                    height = size.height,
                    "Merged source size differs from the first source"
                );
            }
        }

        let range = TimeRange::new(MediaTime::ZERO, duration);
        timeline.insert_into(video_track, &video, range, cursor)?;
        if let Some(audio) = audio {
            let id = *audio_track.get_or_insert_with(|| timeline.add_track(TrackKind::Audio));
            timeline.insert_into(id, &audio, range, cursor)?;
        }

        tracing::debug!(
            source = %source.path().display(),
            at = %cursor,
            duration = %duration,
            "Appended source"
        );
        cursor += duration;
    }

    if let Some(track) = timeline.track_mut(video_track) {
        track.preferred_transform = preferred_transform;
    }

    let composition = Composition::new(timeline, video_track, audio_track, natural_size)?;
    tracing::info!(
        first = %first.path().display(),
        sources = sources.len(),
        duration = %composition.duration(),
        width = natural_size.width,
        height = natural_size.height,
        has_audio = audio_track.is_some(),
        "Opened composition"
    );
    Ok(composition)
}

async fn first_track(
    engine: &dyn MediaEngine,
    source: &SourceRef,
    kind: TrackKind,
) -> EditResult<Option<TrackHandle>> {
    Ok(engine.load_tracks(source, kind).await?.into_iter().next())
}
