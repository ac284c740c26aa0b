//! Error types shared across Framecut crates.

use std::fmt::Display;
use std::path::PathBuf;

/// Top-level error type for Framecut operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// A source track, its duration, or its natural size could not be loaded.
    #[error("Source load error: {message}")]
    SourceLoad { message: String },

    /// Invalid or empty time range, or an offset beyond a track's duration.
    #[error("Range error: {message}")]
    Range { message: String },

    /// A geometric operation was attempted on a track that cannot carry it.
    #[error("Transform state error: {message}")]
    TransformState { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    /// Insertion into a track kind the composition has not created.
    #[error("Cannot insert into composition: no {kind} track")]
    TrackInsert { kind: String },

    #[error("Composition has no {kind} track")]
    MissingTrack { kind: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;

impl EditError {
    pub fn source_load(msg: impl Into<String>) -> Self {
        Self::SourceLoad {
            message: msg.into(),
        }
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range {
            message: msg.into(),
        }
    }

    pub fn transform_state(msg: impl Into<String>) -> Self {
        Self::TransformState {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn track_insert(kind: impl Display) -> Self {
        Self::TrackInsert {
            kind: kind.to_string(),
        }
    }

    pub fn missing_track(kind: impl Display) -> Self {
        Self::MissingTrack {
            kind: kind.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error came from the external media engine rather than
    /// from the edit model itself.
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceLoad { .. } | Self::Export { .. } | Self::Io(_) | Self::Other(_)
        )
    }
}
