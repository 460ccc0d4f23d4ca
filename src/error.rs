//! Error types shared across the viewer engine.
//!
//! Nothing in here is fatal to a running viewer: every variant degrades a
//! single feature (the manifest, one document, or scroll sync) and the
//! host keeps going.

use thiserror::Error;

/// Failure to obtain a resource from a [`crate::store::ResourceSource`].
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn a fetched body into a rendered document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("document is not valid UTF-8 (at byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Failure to persist or read the location token.
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("could not determine the state directory")]
    NoStateDir,

    #[error("I/O error on session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is malformed: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("could not serialize session: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// The viewport capability could not be attached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObserverError {
    #[error("activation ratio {0} is outside (0, 1]")]
    InvalidRatio(f32),

    #[error("viewport has no rows to observe")]
    EmptyViewport,
}

/// Top-level taxonomy reported by the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("manifest unavailable: {0}")]
    ManifestUnavailable(String),

    #[error("Failed to load {path} ({reason})")]
    DocumentLoadFailed { path: String, reason: String },

    #[error("scroll sync disabled: {0}")]
    ObserverSetupFailed(#[from] ObserverError),
}
