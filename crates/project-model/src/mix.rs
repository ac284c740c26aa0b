//! Audio mix descriptor attached to a composition for export.

use framecut_common::MediaTime;
use serde::{Deserialize, Serialize};

use crate::timeline::TrackId;

/// Volume over time for one track.
///
/// Only flat levels are produced today: a single point at time zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeCurve {
    pub points: Vec<(MediaTime, f32)>,
}

impl VolumeCurve {
    pub fn flat(level: f32) -> Self {
        Self {
            points: vec![(MediaTime::ZERO, level)],
        }
    }

    /// Level in effect at `t`.
    pub fn level_at(&self, t: MediaTime) -> f32 {
        self.points
            .iter()
            .take_while(|(at, _)| *at <= t)
            .last()
            .map(|(_, level)| *level)
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixInput {
    pub track: TrackId,
    pub volume: VolumeCurve,
}

/// Ordered `(track, volume curve)` pairs. Track identities are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixDescriptor {
    inputs: Vec<MixInput>,
}

impl MixDescriptor {
    /// Build from inputs, keeping the last entry for a repeated track.
    pub fn from_inputs(inputs: impl IntoIterator<Item = MixInput>) -> Self {
        let mut out: Vec<MixInput> = Vec::new();
        for input in inputs {
            match out.iter_mut().find(|i| i.track == input.track) {
                Some(existing) => existing.volume = input.volume,
                None => out.push(input),
            }
        }
        Self { inputs: out }
    }

    pub fn inputs(&self) -> &[MixInput] {
        &self.inputs
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn level_for(&self, track: TrackId) -> Option<f32> {
        self.inputs
            .iter()
            .find(|i| i.track == track)
            .map(|i| i.volume.level_at(MediaTime::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_track_keeps_last_level_in_first_position() {
        let mix = MixDescriptor::from_inputs([
            MixInput {
                track: TrackId(2),
                volume: VolumeCurve::flat(0.2),
            },
            MixInput {
                track: TrackId(3),
                volume: VolumeCurve::flat(0.8),
            },
            MixInput {
                track: TrackId(2),
                volume: VolumeCurve::flat(0.5),
            },
        ]);
        assert_eq!(mix.inputs().len(), 2);
        assert_eq!(mix.inputs()[0].track, TrackId(2));
        assert_eq!(mix.level_for(TrackId(2)), Some(0.5));
        assert_eq!(mix.level_for(TrackId(9)), None);
    }

    #[test]
    fn test_flat_curve_level() {
        let curve = VolumeCurve::flat(0.3);
        assert_eq!(curve.level_at(MediaTime::from_secs(42)), 0.3);
    }
}
