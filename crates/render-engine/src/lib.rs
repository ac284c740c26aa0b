//! Framecut Render Engine
//!
//! The edit pipeline: a session records edit requests as commands, drains
//! them against the working composition in a fixed order, and hands the
//! result to an external media engine for rendering.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source(s) ──► load / merge ──► Composition
//!                                    │
//! rotate/crop/mirror ──┐             │
//! scale_time ──────────┤             │
//! add_audio/volume ────┼─► CommandQueue ── drain (trims last) ──┐
//! add_layer ───────────┤                                        │
//! crop_time ───────────┘                                        ▼
//!                                                  finalize instructions
//!                                                               │
//!                                      remove stale destination │
//!                                                               ▼
//!                                                   MediaEngine::render
//!                                                               │
//!                                                               ▼
//!                                                          output file
//! ```

pub mod command;
pub mod engine;
pub mod export;
pub mod queue;
pub mod session;
pub mod source;

pub use command::{AudioInsert, Command, CommandKind, EditContext};
pub use engine::{LocalStorage, MediaEngine, RenderJob, RenderOutcome, RenderStatus, Storage};
pub use export::*;
pub use queue::{CommandFailure, CommandQueue, DrainReport};
pub use session::{SessionState, VideoEditingSession};
pub use source::{load_source, merge_sources};
