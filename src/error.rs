// Error Types
//
// Configuration, host and page-request failures. None of these are fatal to
// the host process; the worst outcome is a missed notification.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("target path must be an absolute path, got {0:?}")]
    InvalidTargetPath(String),

    #[error("dispatcher configuration already initialized")]
    AlreadyInitialized,
}

/// Failure reported by a host adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),

    #[error("no open client with id {0}")]
    UnknownClient(String),

    #[error("host platform error: {0}")]
    Platform(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Validation failure of a page request. The `Display` text is what the
/// requesting page receives as `error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("SHOW_NOTIFICATION requires a data object")]
    MissingData,

    #[error("field `{0}` is required")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}
