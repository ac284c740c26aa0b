//! Geometry vocabulary for geometric edits.
//!
//! Sizes and rectangles are in render-space pixels with the origin at the
//! top-left corner. Transforms follow `kurbo`'s convention: `a * b` applies
//! `b` first.

use serde::{Deserialize, Serialize};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Coefficient tolerance when matching orientation matrices.
const ORIENTATION_EPSILON: f64 = 1e-6;

/// Rotation amount, clockwise in display space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateDegree {
    #[default]
    Degree90,
    Degree180,
    Degree270,
}

impl RotateDegree {
    /// Number of sequential quarter turns this rotation expands into.
    pub fn quarter_turns(self) -> u8 {
        match self {
            RotateDegree::Degree90 => 1,
            RotateDegree::Degree180 => 2,
            RotateDegree::Degree270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        u16::from(self.quarter_turns()) * 90
    }
}

/// Axis a mirror edit flips across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorAxis {
    /// Flip left/right.
    #[default]
    Horizontal,
    /// Flip top/bottom.
    Vertical,
}

/// How the recorded frames are oriented relative to upright display.
///
/// Derived from a track's preferred transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrientation {
    /// Frames are stored upright.
    #[default]
    Untransformed,
    /// Frames are stored upside down.
    Rotated180,
    /// Frames must turn a quarter clockwise to be upright (`[0 1 -1 0]`).
    RotatedPlus90,
    /// Frames must turn a quarter counter-clockwise to be upright (`[0 -1 1 0]`).
    RotatedMinus90,
}

impl SourceOrientation {
    /// Classify a preferred transform by its linear part. Anything that is
    /// not one of the four axis-aligned rotations is treated as upright.
    pub fn from_preferred_transform(transform: &Affine) -> Self {
        let [a, b, c, d, _, _] = transform.as_coeffs();
        let is = |actual: f64, expected: f64| (actual - expected).abs() < ORIENTATION_EPSILON;

        if is(a, 0.0) && is(b, 1.0) && is(c, -1.0) && is(d, 0.0) {
            SourceOrientation::RotatedPlus90
        } else if is(a, 0.0) && is(b, -1.0) && is(c, 1.0) && is(d, 0.0) {
            SourceOrientation::RotatedMinus90
        } else if is(a, -1.0) && is(b, 0.0) && is(c, 0.0) && is(d, -1.0) {
            SourceOrientation::Rotated180
        } else {
            SourceOrientation::Untransformed
        }
    }

    /// Whether upright display swaps the stored width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            SourceOrientation::RotatedPlus90 | SourceOrientation::RotatedMinus90
        )
    }

    /// Size of stored frames of `size` once displayed upright.
    pub fn upright_size(self, size: Size) -> Size {
        if self.swaps_dimensions() {
            Size::new(size.height, size.width)
        } else {
            size
        }
    }
}

/// Whether `size` has positive, finite width and height.
pub fn is_drawable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_classification() {
        let plus90 = Affine::new([0.0, 1.0, -1.0, 0.0, 1080.0, 0.0]);
        let minus90 = Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, 1920.0]);
        let upside_down = Affine::new([-1.0, 0.0, 0.0, -1.0, 1920.0, 1080.0]);

        assert_eq!(
            SourceOrientation::from_preferred_transform(&plus90),
            SourceOrientation::RotatedPlus90
        );
        assert_eq!(
            SourceOrientation::from_preferred_transform(&minus90),
            SourceOrientation::RotatedMinus90
        );
        assert_eq!(
            SourceOrientation::from_preferred_transform(&upside_down),
            SourceOrientation::Rotated180
        );
        assert_eq!(
            SourceOrientation::from_preferred_transform(&Affine::IDENTITY),
            SourceOrientation::Untransformed
        );
    }

    #[test]
    fn test_unrecognized_transform_is_untransformed() {
        let skewed = Affine::new([1.0, 0.3, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(
            SourceOrientation::from_preferred_transform(&skewed),
            SourceOrientation::Untransformed
        );
    }

    #[test]
    fn test_upright_size_swaps_for_quarter_turns() {
        let sensor = Size::new(1920.0, 1080.0);
        assert_eq!(
            SourceOrientation::RotatedPlus90.upright_size(sensor),
            Size::new(1080.0, 1920.0)
        );
        assert_eq!(SourceOrientation::Rotated180.upright_size(sensor), sensor);
    }

    #[test]
    fn test_rotate_degree_quarter_turns() {
        assert_eq!(RotateDegree::Degree90.quarter_turns(), 1);
        assert_eq!(RotateDegree::Degree270.quarter_turns(), 3);
        assert_eq!(RotateDegree::Degree180.degrees(), 180);
    }
}
