//! Failure taxonomy for remote requests.
//!
//! Every request ends in exactly one terminal value. Failures are reported as a
//! [`FailureKind`], a closed set of kinds. Kinds that wrap a lower-level error
//! keep it for diagnostics (see [`std::error::Error::source`]).
//!
//! Equality is by kind only: two `Message` failures compare equal whatever
//! their text. Compare [`FailureKind::describe`] when the text matters.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use thiserror::Error;

/// A lower-level error retained inside a [`FailureKind`].
pub type Underlying = Arc<dyn StdError + Send + Sync + 'static>;

/// The kind of failure that terminated a request.
#[derive(Debug, Clone, Error)]
pub enum FailureKind {
    /// The user switched the application offline.
    #[error("Device is offline")]
    ManuallyOffline,
    /// The device has no usable network path.
    #[error("No network connection")]
    ConnectivityError,
    /// Generic HTTP failure.
    #[error("HTTP error")]
    HttpError,
    /// Credentials were rejected.
    #[error("Authentication failed")]
    Authentication,
    /// The server failed to process the request.
    #[error("Server error")]
    ServerError,
    /// A value could not be encoded.
    #[error("Encoding error")]
    Encoding,
    /// A response could not be parsed.
    #[error("Unable to parse response")]
    ParsingError,
    /// The request could not be built.
    #[error("Invalid request")]
    InvalidRequest,
    /// The transport produced no usable response.
    #[error("Invalid response")]
    InvalidResponse,
    /// The base URL is missing or malformed.
    #[error("Invalid URL")]
    InvalidUrl,
    /// Expected bytes were absent.
    #[error("No data")]
    NullData,
    /// Data was present but unusable.
    #[error("Invalid data")]
    InvalidData,
    /// The server answered 401.
    #[error("Unauthorized")]
    Unauthorized,
    /// A failure message with the error that caused it.
    #[error("{description}")]
    MessageWithError {
        /// The error that caused the failure, if any.
        #[source]
        source: Option<Underlying>,
        /// Human-readable description.
        description: String,
    },
    /// A failure message, usually extracted from the response body.
    #[error("{0}")]
    Message(String),
    /// Transport or decode failure not otherwise classified.
    #[error("Network error: {0}")]
    Network(#[source] Underlying),
    /// The request failed before a response was received.
    #[error("Request failed: {0}")]
    RequestFailed(#[source] Underlying),
    /// Anything else.
    #[error("Unknown error: {0}")]
    Unknown(#[source] Underlying),
}

impl FailureKind {
    /// Create a [`FailureKind::Message`].
    pub fn message(description: impl Into<String>) -> Self {
        Self::Message(description.into())
    }

    /// Create a [`FailureKind::MessageWithError`].
    pub fn message_with_error<E>(source: E, description: impl Into<String>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::MessageWithError {
            source: Some(Arc::new(source)),
            description: description.into(),
        }
    }

    /// Wrap an error as [`FailureKind::Network`].
    pub fn network<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Network(Arc::new(err))
    }

    /// Wrap an error as [`FailureKind::RequestFailed`].
    pub fn request_failed<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::RequestFailed(Arc::new(err))
    }

    /// Wrap an error as [`FailureKind::Unknown`].
    pub fn unknown<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Unknown(Arc::new(err))
    }

    /// Text carried by the message kinds.
    ///
    /// Returns the description of `Message` and `MessageWithError`, and an
    /// empty string for every other kind. Callers map the remaining kinds to
    /// their own user-facing copy.
    pub fn describe(&self) -> &str {
        match self {
            Self::MessageWithError { description, .. } => description,
            Self::Message(description) => description,
            _ => "",
        }
    }

    /// The retained lower-level error, if this kind carries one.
    pub fn underlying(&self) -> Option<&Underlying> {
        match self {
            Self::MessageWithError { source, .. } => source.as_ref(),
            Self::Network(err) | Self::RequestFailed(err) | Self::Unknown(err) => Some(err),
            _ => None,
        }
    }
}

impl PartialEq for FailureKind {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Eq for FailureKind {}

/// A specialized Result type for remote request operations.
pub type Result<T> = std::result::Result<T, FailureKind>;

/// Errors setting up reachability monitoring.
#[derive(Debug, Error)]
pub enum ReachabilityError {
    /// The reachability queue thread could not be started.
    #[error("Failed to start reachability queue: {0}")]
    Spawn(#[source] io::Error),
}

/// Whether a transport error means the device is offline or the link dropped.
///
/// Only I/O errors in the source chain that signal no route or a lost link
/// count. Refused connections and name resolution failures do not: the
/// device is online, the target is wrong.
pub(crate) fn is_connectivity_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if is_connectivity_kind(io_err.kind()) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

fn is_connectivity_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::NotConnected
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_kinds() {
        assert!(is_connectivity_kind(io::ErrorKind::NotConnected));
        assert!(is_connectivity_kind(io::ErrorKind::NetworkUnreachable));
        assert!(is_connectivity_kind(io::ErrorKind::ConnectionReset));
        assert!(is_connectivity_kind(io::ErrorKind::BrokenPipe));

        assert!(!is_connectivity_kind(io::ErrorKind::ConnectionRefused));
        assert!(!is_connectivity_kind(io::ErrorKind::TimedOut));
        assert!(!is_connectivity_kind(io::ErrorKind::Other));
    }
}
