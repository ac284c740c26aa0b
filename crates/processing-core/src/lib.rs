//! Framecut Processing Core
//!
//! The arithmetic behind each edit:
//! - **Transform algebra:** rotate, crop and mirror deltas accumulated onto
//!   the open instruction, with the render size threaded through explicitly
//! - **Orientation:** upright correction for each source orientation class
//! - **Audio mix:** per-track levels and the insertion-length clamp
//! - **Overlay layout:** where the frame border and text labels land
//!
//! This crate is pure computation: no I/O, no async, no media engine.
//! All inputs are data; all outputs are data.

pub mod layers;
pub mod mix;
pub mod orientation;
pub mod transform;

pub use layers::layout_overlay;
pub use mix::{compute_insertion_range, MixBuilder};
pub use transform::{apply_crop, apply_mirror, apply_quarter_turn, apply_rotate, GeometryOp};
