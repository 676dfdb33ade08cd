use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Path errors
// ---------------------------------------------------------------------------

/// A write addressed through something that is not a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The root path names the whole record and cannot be assigned.
    #[error("cannot write to the root path")]
    EmptyPath,
    /// A segment tried to descend into, or assign a field of, a value that
    /// cannot hold it (a primitive, or a sequence addressed by a key).
    #[error("cannot address '{segment}' inside {found} at '{at}'")]
    Conflict {
        /// Dotted prefix of the node that rejected the segment ("" = root).
        at: String,
        segment: String,
        found: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
