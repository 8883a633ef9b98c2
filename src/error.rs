//! Error types.

use axum::extract::rejection::JsonRejection;
use std::path::PathBuf;

/// Error enumerates the possible dhcpctl error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a configuration file the editors work on can't be read.
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Returned when a configuration file the editors work on can't be written. A failed
    /// rewrite never leaves a partially written file behind, see [`crate::persist`].
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Returned by [`HostStore::update_host`][crate::host_store::HostStore::update_host] when
    /// no `host` block with the given name exists.
    #[error("host \"{0}\" not found")]
    HostNotFound(String),

    /// Returned when writing interface selections and the interfaces file does not exist.
    /// Unlike reads, writes never create the file.
    #[error("interfaces config file {} does not exist", .0.display())]
    InterfacesFileMissing(PathBuf),

    /// Returned when an interface family other than `v4` or `v6` is requested.
    #[error("invalid interface type: {0}, must be v4 or v6")]
    InvalidInterfaceType(String),

    /// Returned when a request lacks a valid bearer token for the
    /// [HTTP API][crate::api].
    #[error("{0}")]
    AuthForbidden(&'static str),

    /// Returned when clients send invalid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when a well-formed request is missing a required value.
    #[error("invalid request payload: {0}")]
    InvalidRequest(String),

    /// Returned when a token update asks for an empty token.
    #[error("token cannot be empty")]
    EmptyToken,

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [loading a `Config`][crate::config::Config::try_from_file] fails due to
    /// invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when a blocking file operation panicked or was cancelled.
    #[error("blocking file task failed")]
    BlockingTask(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}
