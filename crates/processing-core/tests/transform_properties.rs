//! Property tests for the transform algebra.
//!
//! Replaying geometric edits through the open instruction must agree with
//! folding each edit's size function over the initial size.

use framecut_common::MediaTime;
use framecut_processing_core::transform::{apply_rotate, fold_render_size, GeometryOp};
use framecut_project_model::geometry::{MirrorAxis, Rect, RotateDegree, Size, SourceOrientation};
use framecut_project_model::instruction::GeometryState;
use framecut_project_model::timeline::TrackId;
use proptest::prelude::*;

const TRACK: TrackId = TrackId(1);

/// Edits whose crops are expressed as fractions of whatever frame they see,
/// so every generated sequence stays valid.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Rotate(RotateDegree),
    Mirror(MirrorAxis),
    Crop { fx: f64, fy: f64, fw: f64, fh: f64 },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        prop_oneof![
            Just(RotateDegree::Degree90),
            Just(RotateDegree::Degree180),
            Just(RotateDegree::Degree270),
        ]
        .prop_map(Edit::Rotate),
        prop_oneof![Just(MirrorAxis::Horizontal), Just(MirrorAxis::Vertical)]
            .prop_map(Edit::Mirror),
        (0.0..0.5f64, 0.0..0.5f64, 0.1..0.5f64, 0.1..0.5f64)
            .prop_map(|(fx, fy, fw, fh)| Edit::Crop { fx, fy, fw, fh }),
    ]
}

fn orientation_strategy() -> impl Strategy<Value = SourceOrientation> {
    prop_oneof![
        Just(SourceOrientation::Untransformed),
        Just(SourceOrientation::Rotated180),
        Just(SourceOrientation::RotatedPlus90),
        Just(SourceOrientation::RotatedMinus90),
    ]
}

/// Resolve `edits` into concrete ops by walking the sizes they produce.
fn concretize(initial: Size, orientation: SourceOrientation, edits: &[Edit]) -> Vec<GeometryOp> {
    let mut size = initial;
    let mut pending = orientation;
    let mut ops = Vec::with_capacity(edits.len());
    for edit in edits {
        let op = match *edit {
            Edit::Rotate(degree) => GeometryOp::Rotate(degree),
            Edit::Mirror(axis) => GeometryOp::Mirror(axis),
            Edit::Crop { fx, fy, fw, fh } => {
                let bounds = pending.upright_size(size);
                let x0 = (bounds.width * fx).floor();
                let y0 = (bounds.height * fy).floor();
                let w = (bounds.width * fw).floor().max(1.0);
                let h = (bounds.height * fh).floor().max(1.0);
                GeometryOp::Crop(Rect::new(x0, y0, x0 + w, y0 + h))
            }
        };
        size = op.step(size, pending).expect("generated op is valid").0;
        if matches!(op, GeometryOp::Crop(_)) {
            pending = SourceOrientation::Untransformed;
        }
        ops.push(op);
    }
    ops
}

proptest! {
    #[test]
    fn replay_matches_left_fold(
        width in 64u32..4096,
        height in 64u32..4096,
        orientation in orientation_strategy(),
        edits in prop::collection::vec(edit_strategy(), 1..8),
    ) {
        let initial = Size::new(f64::from(width), f64::from(height));
        let ops = concretize(initial, orientation, &edits);

        let mut state = GeometryState::new(initial, orientation);
        for op in &ops {
            op.apply_to(&mut state, TRACK, MediaTime::from_secs(5)).unwrap();
        }
        let folded = fold_render_size(initial, orientation, &ops).unwrap();

        prop_assert_eq!(state.render_size, folded);
        prop_assert_eq!(state.instructions.len(), 1);
    }

    #[test]
    fn four_quarter_turns_restore_size(width in 1u32..8192, height in 1u32..8192) {
        let initial = Size::new(f64::from(width), f64::from(height));
        let mut state = GeometryState::new(initial, SourceOrientation::Untransformed);
        for _ in 0..4 {
            GeometryOp::Rotate(RotateDegree::Degree90)
                .apply_to(&mut state, TRACK, MediaTime::from_secs(1))
                .unwrap();
        }
        prop_assert_eq!(state.render_size, initial);

        let (size, _) = apply_rotate(initial, 4);
        prop_assert_eq!(size, initial);
    }

    #[test]
    fn crop_order_relative_to_rotate_matters(
        width in 200u32..2000,
        height in 200u32..2000,
        side in 10u32..100,
    ) {
        let initial = Size::new(f64::from(width), f64::from(height));
        let rect = Rect::new(0.0, 0.0, f64::from(side), f64::from(side) * 1.5);
        let rotate = GeometryOp::Rotate(RotateDegree::Degree90);
        let crop = GeometryOp::Crop(rect);

        let mut rotate_first = GeometryState::new(initial, SourceOrientation::Untransformed);
        rotate.apply_to(&mut rotate_first, TRACK, MediaTime::from_secs(1)).unwrap();
        crop.apply_to(&mut rotate_first, TRACK, MediaTime::from_secs(1)).unwrap();

        let mut crop_first = GeometryState::new(initial, SourceOrientation::Untransformed);
        crop.apply_to(&mut crop_first, TRACK, MediaTime::from_secs(1)).unwrap();
        rotate.apply_to(&mut crop_first, TRACK, MediaTime::from_secs(1)).unwrap();

        prop_assert_ne!(rotate_first.render_size, crop_first.render_size);
        prop_assert_ne!(
            rotate_first.current_transform(TRACK),
            crop_first.current_transform(TRACK)
        );
    }
}
