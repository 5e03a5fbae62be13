//! Error types for the route guide service.
//!
//! This module defines the central `Error` enum shared by the server and its
//! startup path. It implements `From<Error>` for `tonic::Status` so handlers
//! can bubble errors with `?` and clients see a matching status code.
//!
//! ## Error Cases
//! - `Transport`: the peer's inbound stream failed. The original status is
//!   carried unchanged and handed back verbatim.
//! - `ChannelError`: the response conduit refused an item, typically because
//!   the client went away.
//! - `ServiceShutdown`: a call arrived, or was still running, while the
//!   service was shutting down.
//! - `Dataset`: the feature dataset could not be read or parsed at startup.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the route guide service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// Receiving from the client stream failed.
    #[error("Transport error: {0}")]
    Transport(#[from] Status),

    /// Internal channel send failure (e.g., closed response stream).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// The startup dataset is unreadable or malformed.
    #[error("Failed to load dataset `{path}`: {reason}")]
    Dataset { path: String, reason: String },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Transport(status) => status,
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {}", context))
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
            Error::Dataset { path, reason } => {
                Status::internal(format!("Dataset `{}` unavailable: {}", path, reason))
            }
        }
    }
}
