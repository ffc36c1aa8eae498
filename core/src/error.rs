//! Error types for the frame pipeline

use std::io;

use thiserror::Error;

/// Failures in the frame buffer and threading layer.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Surface or metadata allocation failed. Fatal at startup.
    #[error("failed to allocate {what} ({bytes} bytes)")]
    Allocation { what: &'static str, bytes: usize },

    /// The frame buffer was torn down and can no longer be written.
    #[error("frame buffer has been torn down")]
    TornDown,

    #[error("invalid buffer index {0} (expected 0 or 1)")]
    InvalidIndex(usize),

    #[error("failed to spawn {name} thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Failures reported by an emulation core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("no game loaded")]
    NoGame,

    #[error("emulation fault: {0}")]
    Fault(String),
}

/// Failures writing the config file. Loading never fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config I/O error")]
    Io(#[from] io::Error),

    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}
