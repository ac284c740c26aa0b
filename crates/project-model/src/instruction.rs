//! Time-ranged transform instructions and the running geometry state.

use framecut_common::MediaTime;
use kurbo::{Affine, Size};
use serde::{Deserialize, Serialize};

use crate::geometry::SourceOrientation;
use crate::timeline::{TimeRange, TrackId};

/// Cumulative transform applied to one track for an instruction's range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerInstruction {
    pub track: TrackId,
    pub transform: Affine,
}

/// A time range and the transforms every listed track renders with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub time_range: TimeRange,
    pub layers: Vec<LayerInstruction>,
}

impl Instruction {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            layers: Vec::new(),
        }
    }

    pub fn transform_for(&self, track: TrackId) -> Option<Affine> {
        self.layers
            .iter()
            .find(|l| l.track == track)
            .map(|l| l.transform)
    }

    /// Layer entry for `track`, seeded with the identity when absent.
    pub fn layer_mut(&mut self, track: TrackId) -> &mut LayerInstruction {
        if let Some(idx) = self.layers.iter().position(|l| l.track == track) {
            return &mut self.layers[idx];
        }
        self.layers.push(LayerInstruction {
            track,
            transform: Affine::IDENTITY,
        });
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }
}

/// Ordered instructions accumulated by geometric edits.
///
/// While edits are applied there is at most one open instruction (the
/// last). [`InstructionSequence::finalize`] makes the sequence partition the
/// track duration without gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
}

impl InstructionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The open instruction, if any edit has created one.
    pub fn active(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// The open instruction spanning up to `duration`.
    ///
    /// Creates one over `[0, duration)` when the sequence is empty. When the
    /// duration moved since the instruction was opened (a time-scale edit
    /// ran in between) the open instruction is re-spanned to end at the
    /// current duration.
    pub fn ensure_active(&mut self, duration: MediaTime) -> &mut Instruction {
        if self.instructions.is_empty() {
            self.instructions
                .push(Instruction::new(TimeRange::new(MediaTime::ZERO, duration)));
        }
        let last = self.instructions.len() - 1;
        let active = &mut self.instructions[last];
        if active.time_range.end() != duration {
            let start = active.time_range.start.min(duration);
            active.time_range = TimeRange::new(start, duration.saturating_sub(start));
        }
        active
    }

    /// Close the sequence over `[0, duration)` for `track`.
    ///
    /// Instructions starting at or past the end are dropped, the rest are
    /// made contiguous and the last is stretched to the end. An empty
    /// sequence gets a single identity instruction.
    pub fn finalize(&mut self, track: TrackId, duration: MediaTime) {
        if !duration.is_zero() {
            self.instructions
                .retain(|i| i.time_range.start < duration || i.time_range.start.is_zero());
        }
        if self.instructions.is_empty() {
            self.instructions
                .push(Instruction::new(TimeRange::new(MediaTime::ZERO, duration)));
        }

        let mut cursor = MediaTime::ZERO;
        let count = self.instructions.len();
        for (i, instruction) in self.instructions.iter_mut().enumerate() {
            let end = if i + 1 == count {
                duration
            } else {
                instruction.time_range.end().min(duration).max(cursor)
            };
            instruction.time_range = TimeRange::new(cursor, end.saturating_sub(cursor));
            instruction.layer_mut(track);
            cursor = end;
        }
    }
}

/// Running state threaded through geometric edits.
///
/// Every geometric edit reads `render_size`, composes its delta onto the
/// open instruction, and writes the new size back. Keeping these together
/// makes the order of edits explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryState {
    /// Size of the rendered frame after every geometric edit so far.
    pub render_size: Size,
    /// Orientation correction still owed by the next crop.
    pub orientation: SourceOrientation,
    pub instructions: InstructionSequence,
}

impl GeometryState {
    pub fn new(render_size: Size, orientation: SourceOrientation) -> Self {
        Self {
            render_size,
            orientation,
            instructions: InstructionSequence::new(),
        }
    }

    /// Transform of `track` in the open instruction (identity when none).
    pub fn current_transform(&self, track: TrackId) -> Affine {
        self.instructions
            .active()
            .and_then(|i| i.transform_for(track))
            .unwrap_or(Affine::IDENTITY)
    }
}
