//! Upright correction per source orientation class.
//!
//! Each function maps stored frames of `size` into upright display space,
//! with the result anchored inside `[0, w'] x [0, h']` where `(w', h')` is
//! [`SourceOrientation::upright_size`].

use framecut_project_model::geometry::{Affine, Size, SourceOrientation};

/// Correction that turns frames stored with `orientation` upright.
pub fn upright_correction(orientation: SourceOrientation, size: Size) -> Affine {
    match orientation {
        SourceOrientation::Untransformed => untransformed(size),
        SourceOrientation::Rotated180 => rotated_180(size),
        SourceOrientation::RotatedPlus90 => rotated_plus_90(size),
        SourceOrientation::RotatedMinus90 => rotated_minus_90(size),
    }
}

pub fn untransformed(_size: Size) -> Affine {
    Affine::IDENTITY
}

/// `(x, y) -> (W - x, H - y)`
pub fn rotated_180(size: Size) -> Affine {
    Affine::new([-1.0, 0.0, 0.0, -1.0, size.width, size.height])
}

/// `(x, y) -> (H - y, x)`
pub fn rotated_plus_90(size: Size) -> Affine {
    Affine::new([0.0, 1.0, -1.0, 0.0, size.height, 0.0])
}

/// `(x, y) -> (y, W - x)`
pub fn rotated_minus_90(size: Size) -> Affine {
    Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, size.width])
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecut_project_model::geometry::{Point, Rect};

    const ALL: [SourceOrientation; 4] = [
        SourceOrientation::Untransformed,
        SourceOrientation::Rotated180,
        SourceOrientation::RotatedPlus90,
        SourceOrientation::RotatedMinus90,
    ];

    fn corners(size: Size) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(size.width, 0.0),
            Point::new(0.0, size.height),
            Point::new(size.width, size.height),
        ]
    }

    #[test]
    fn test_corrected_frame_fills_upright_bounds() {
        let stored = Size::new(1920.0, 1080.0);
        for orientation in ALL {
            let correction = upright_correction(orientation, stored);
            let upright = orientation.upright_size(stored);
            let origin = correction * Point::ZERO;
            let bounds = corners(stored)
                .iter()
                .map(|p| correction * *p)
                .fold(Rect::from_points(origin, origin), |r, p| r.union_pt(p));
            assert_eq!(bounds, Rect::from_origin_size(Point::ZERO, upright), "{orientation:?}");
        }
    }

    #[test]
    fn test_plus_90_moves_top_left_to_top_right() {
        let stored = Size::new(1920.0, 1080.0);
        let mapped = rotated_plus_90(stored) * Point::new(0.0, 0.0);
        assert_eq!(mapped, Point::new(1080.0, 0.0));
    }

    #[test]
    fn test_opposite_quarter_corrections_cancel() {
        let stored = Size::new(1920.0, 1080.0);
        let upright = SourceOrientation::RotatedPlus90.upright_size(stored);
        let there = rotated_plus_90(stored);
        let back = rotated_minus_90(upright);
        let p = Point::new(300.0, 200.0);
        assert_eq!((back * there) * p, p);
    }
}
