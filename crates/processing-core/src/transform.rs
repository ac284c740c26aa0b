//! Transform algebra for geometric edits.
//!
//! Every geometric edit is a function of the current render size that
//! returns the new render size and a transform delta. The delta is composed
//! onto the transform already held by the open instruction, so edits are
//! cumulative and their order matters: a crop after a rotate cuts from the
//! rotated frame, a rotate after a crop turns the cropped frame.
//!
//! With `kurbo`'s convention (`a * b` applies `b` first) accumulating a
//! delta onto an existing transform is `delta * existing`.

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_project_model::geometry::{
    Affine, MirrorAxis, Point, Rect, RotateDegree, Size, SourceOrientation,
};
use framecut_project_model::instruction::GeometryState;
use framecut_project_model::timeline::TrackId;
use serde::{Deserialize, Serialize};

use crate::orientation::upright_correction;

/// Slack allowed when checking a crop rectangle against the frame bounds.
const BOUNDS_EPSILON: f64 = 1e-9;

/// One quarter turn clockwise.
///
/// `(x, y) -> (h - y, x)`: the frame turns about the origin and is shifted
/// right by the old height so it stays inside `[0, h] x [0, w]`.
pub fn apply_quarter_turn(size: Size) -> (Size, Affine) {
    let delta = Affine::new([0.0, 1.0, -1.0, 0.0, size.height, 0.0]);
    (Size::new(size.height, size.width), delta)
}

/// `quarter_turns` sequential quarter turns, each reading the size the
/// previous one produced.
pub fn apply_rotate(size: Size, quarter_turns: u8) -> (Size, Affine) {
    (0..quarter_turns).fold((size, Affine::IDENTITY), |(size, acc), _| {
        let (next, delta) = apply_quarter_turn(size);
        (next, delta * acc)
    })
}

/// Crop `rect` out of a frame of `size`.
///
/// `rect` is expressed in upright coordinates: for a source whose frames
/// are stored turned, the frame is first corrected by its orientation
/// class and the rectangle is read from the corrected frame. The new render
/// size is the rectangle's size.
pub fn apply_crop(
    size: Size,
    rect: Rect,
    orientation: SourceOrientation,
) -> EditResult<(Size, Affine)> {
    let bounds = orientation.upright_size(size);
    if !(rect.width() > 0.0 && rect.height() > 0.0) {
        return Err(EditError::range(format!(
            "crop rectangle {rect:?} is empty"
        )));
    }
    if rect.x0 < -BOUNDS_EPSILON
        || rect.y0 < -BOUNDS_EPSILON
        || rect.x1 > bounds.width + BOUNDS_EPSILON
        || rect.y1 > bounds.height + BOUNDS_EPSILON
    {
        return Err(EditError::range(format!(
            "crop rectangle {rect:?} exceeds frame {}x{}",
            bounds.width, bounds.height
        )));
    }

    let correction = upright_correction(orientation, size);
    let delta = Affine::translate(Point::ZERO - rect.origin()) * correction;
    Ok((rect.size(), delta))
}

/// Flip across `axis`. The render size is unchanged.
pub fn apply_mirror(size: Size, axis: MirrorAxis) -> (Size, Affine) {
    let delta = match axis {
        MirrorAxis::Horizontal => {
            Affine::translate((size.width, 0.0)) * Affine::scale_non_uniform(-1.0, 1.0)
        }
        MirrorAxis::Vertical => {
            Affine::translate((0.0, size.height)) * Affine::scale_non_uniform(1.0, -1.0)
        }
    };
    (size, delta)
}

/// A geometric edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum GeometryOp {
    Rotate(RotateDegree),
    Crop(Rect),
    Mirror(MirrorAxis),
}

impl GeometryOp {
    /// New render size and delta for this edit from `size`.
    pub fn step(
        &self,
        size: Size,
        orientation: SourceOrientation,
    ) -> EditResult<(Size, Affine)> {
        match *self {
            GeometryOp::Rotate(degree) => Ok(apply_rotate(size, degree.quarter_turns())),
            GeometryOp::Crop(rect) => apply_crop(size, rect, orientation),
            GeometryOp::Mirror(axis) => Ok(apply_mirror(size, axis)),
        }
    }

    /// Compose this edit onto `track`'s transform in the open instruction.
    ///
    /// Nothing changes when the edit fails. A crop consumes the pending
    /// orientation correction; later crops work in upright space.
    pub fn apply_to(
        &self,
        state: &mut GeometryState,
        track: TrackId,
        duration: MediaTime,
    ) -> EditResult<()> {
        if duration.is_zero() {
            return Err(EditError::transform_state(format!(
                "cannot {} video track {track} with no duration",
                self.verb()
            )));
        }

        match *self {
            GeometryOp::Rotate(degree) => {
                for _ in 0..degree.quarter_turns() {
                    let (size, delta) = apply_quarter_turn(state.render_size);
                    compose(state, track, duration, size, delta);
                }
            }
            GeometryOp::Crop(rect) => {
                let (size, delta) = apply_crop(state.render_size, rect, state.orientation)?;
                compose(state, track, duration, size, delta);
                state.orientation = SourceOrientation::Untransformed;
            }
            GeometryOp::Mirror(axis) => {
                let (size, delta) = apply_mirror(state.render_size, axis);
                compose(state, track, duration, size, delta);
            }
        }

        tracing::debug!(
            op = ?self,
            width = state.render_size.width,
            height = state.render_size.height,
            "Applied geometric edit"
        );
        Ok(())
    }

    fn verb(&self) -> &'static str {
        match self {
            GeometryOp::Rotate(_) => "rotate",
            GeometryOp::Crop(_) => "crop",
            GeometryOp::Mirror(_) => "mirror",
        }
    }
}

fn compose(
    state: &mut GeometryState,
    track: TrackId,
    duration: MediaTime,
    size: Size,
    delta: Affine,
) {
    let layer = state.instructions.ensure_active(duration).layer_mut(track);
    layer.transform = delta * layer.transform;
    state.render_size = size;
}

/// Render size after applying `ops` in order, starting from `initial`.
///
/// Only the first crop sees `orientation`, matching [`GeometryOp::apply_to`].
pub fn fold_render_size(
    initial: Size,
    orientation: SourceOrientation,
    ops: &[GeometryOp],
) -> EditResult<Size> {
    let mut pending = orientation;
    ops.iter().try_fold(initial, |size, op| {
        let (next, _) = op.step(size, pending)?;
        if matches!(op, GeometryOp::Crop(_)) {
            pending = SourceOrientation::Untransformed;
        }
        Ok(next)
    })
}
