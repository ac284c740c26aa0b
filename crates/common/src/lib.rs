//! Framecut Common Utilities
//!
//! Shared infrastructure for all Framecut crates:
//! - Error taxonomy and result aliases
//! - Media time arithmetic (nanosecond precision)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use config::*;
pub use error::*;
pub use time::*;
