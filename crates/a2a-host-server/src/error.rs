//! Error hierarchy for the host service.
//!
//! Failures are split by where they happen so each class can be reported
//! and, for callers, retried differently:
//!
//! - [`RunnerError`] - the agent runtime failed to start or to continue a run
//! - [`SessionError`] - the session store rejected a create or lookup
//! - [`EncodeError`] - a frame could not be serialized
//! - [`TransportError`] - HTTP-level failure between us and the runtime or client
//!
//! # Example
//!
//! ```rust
//! use a2a_host_server::error::{HostError, TransportError};
//!
//! fn report(err: &HostError) {
//!     if err.is_retryable() {
//!         tracing::warn!(code = err.code(), %err, "runtime unreachable");
//!     } else {
//!         tracing::error!(code = err.code(), %err, "request failed");
//!     }
//! }
//!
//! report(&HostError::Transport(TransportError::Timeout { duration_ms: 10_000 }));
//! ```

use a2a_host_core::SessionKey;
use thiserror::Error;

/// Top-level error of a chat request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HostError {
    /// The agent runtime failed while starting or iterating a run.
    #[error("agent runner failed: {0}")]
    Runner(#[from] RunnerError),

    /// Session store operation failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("frame could not be encoded: {0}")]
    Encoding(#[from] EncodeError),

    /// The runtime could not be reached or answered with a failure status.
    #[error("runtime transport failed: {0}")]
    Transport(#[from] TransportError),

    /// An event arrived after the run had already finished.
    #[error("protocol violation: {violation}")]
    ProtocolViolation { violation: String },

    /// A bug on our side; `location` is `file:line`.
    #[error("internal failure at {location}: {message}")]
    Internal {
        message: String,
        location: &'static str,
    },
}

impl HostError {
    /// Backs [`internal_error!`].
    #[doc(hidden)]
    #[must_use]
    pub fn internal(message: impl Into<String>, location: &'static str) -> Self {
        Self::Internal {
            message: message.into(),
            location,
        }
    }

    /// Stable machine-readable code reported to clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Runner(_) => "RUNNER_ERROR",
            Self::Session(_) => "SESSION_ERROR",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::ProtocolViolation { .. } => "PROTOCOL_VIOLATION",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may reasonably retry the same request.
    ///
    /// The service never retries on its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(TransportError::Timeout { .. } | TransportError::ConnectionFailed { .. })
        )
    }
}

/// Builds a [`HostError::Internal`] stamped with the call site.
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::error::HostError::internal($msg, concat!(file!(), ":", line!()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::HostError::internal(format!($fmt, $($arg)*), concat!(file!(), ":", line!()))
    };
}

/// Failures reported by the agent runtime itself.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RunnerError {
    /// The run could not be started.
    #[error("{message}")]
    Invocation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The run failed after events started flowing.
    #[error("run failed mid-stream: {message}")]
    Stream { message: String },

    #[error("undecodable event: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl RunnerError {
    #[must_use]
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation {
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn invocation_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Invocation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }
}

/// Errors from the session store.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session '{key}' already exists")]
    AlreadyExists { key: SessionKey },

    #[error("session '{key}' not found")]
    NotFound { key: SessionKey },

    /// The store answered with something other than a session record.
    #[error("session store failure: {reason}")]
    Backend { reason: String },
}

/// Why a stream frame could not be turned into bytes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("{frame_type} frame is not serializable: {source}")]
    Json {
        frame_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The serialized frame is larger than one `data:` payload may be.
    #[error("frame of {size} bytes is over the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },
}

impl EncodeError {
    #[must_use]
    pub fn json(frame_type: &'static str, source: serde_json::Error) -> Self {
        Self::Json { frame_type, source }
    }
}

/// Failures talking HTTP to the agent runtime.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    #[error("no answer from the runtime within {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The runtime answered with a non-success status; `message` is its body.
    #[error("runtime returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("could not reach the runtime: {reason}")]
    ConnectionFailed { reason: String },
}

impl TransportError {
    /// Classify a `reqwest` failure.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                duration_ms: timeout_ms,
            }
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::ConnectionFailed {
                reason: err.to_string(),
            }
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

pub type EncodeResult<T> = Result<T, EncodeError>;
