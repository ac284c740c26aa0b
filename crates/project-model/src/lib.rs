//! Framecut Project Model
//!
//! Defines the data contracts of an editing pipeline:
//! - **Timeline:** Composition tracks built from time-ranged source segments
//! - **Geometry:** Render sizes, crop rectangles, and source orientation
//! - **Instructions:** Time-ranged cumulative transforms per track
//! - **Mix:** Per-track volume levels blended at render time
//! - **Layers:** Overlay payloads and their computed layout
//! - **Composition:** The working state that commands mutate
//! - **Export:** Parameters handed to the media engine
//!
//! All times are [`framecut_common::MediaTime`] values; all geometry is
//! in render-space pixels.

pub mod composition;
pub mod export;
pub mod geometry;
pub mod instruction;
pub mod layer;
pub mod mix;
pub mod timeline;

pub use composition::*;
pub use export::*;
pub use geometry::*;
pub use instruction::*;
pub use layer::*;
pub use mix::*;
pub use timeline::*;
