//! Response classification.
//!
//! A raw status and body become either a success value or a [`FailureKind`]:
//!
//! - `200..=299` is success.
//! - `401` is always [`FailureKind::Unauthorized`].
//! - Anything else is a [`FailureKind::Message`] whose text comes from the
//!   first error envelope the body decodes as, or `"Failed to decode"`.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, Result};

/// Message used when no error envelope matches the body.
pub const UNDECODABLE_BODY_MESSAGE: &str = "Failed to decode";

/// Success-shaped body that some servers also return with error statuses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    /// Application status code.
    pub status: Option<i64>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Numeric payload.
    pub data: Option<i64>,
    /// Identifier of the affected user.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Error body with structured detail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Application status code.
    pub status: Option<i64>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Collected messages.
    pub data: Option<ErrorDetail>,
}

/// Message lists attached to an [`ErrorEnvelope`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Warnings.
    #[serde(rename = "all_warning_messages")]
    pub warnings: Option<Vec<String>>,
    /// Informational messages.
    #[serde(rename = "all_non_error_messages")]
    pub non_errors: Option<Vec<String>>,
    /// Errors.
    #[serde(rename = "all_error_messages")]
    pub errors: Option<Vec<String>>,
}

/// Error body without detail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BareErrorEnvelope {
    /// Application status code.
    pub status: Option<i64>,
    /// Human-readable message.
    pub message: Option<String>,
}

/// Classifies raw responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseClassifier;

impl ResponseClassifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify a response, returning the raw body on success.
    ///
    /// A missing status means the transport produced no HTTP response and
    /// yields [`FailureKind::InvalidResponse`]; a missing body yields
    /// [`FailureKind::NullData`]. A 2xx body is returned untouched even if it
    /// will not decode later.
    pub fn classify(&self, status: Option<u16>, body: Option<&[u8]>) -> Result<Bytes> {
        let status = status.ok_or(FailureKind::InvalidResponse)?;
        let body = body.ok_or(FailureKind::NullData)?;

        match status {
            200..=299 => {
                tracing::trace!(target: "remote_request_net::http", status, body_len = body.len(), "Response succeeded");
                Ok(Bytes::copy_from_slice(body))
            }
            401 => Err(FailureKind::Unauthorized),
            _ => Err(Self::error_from_body(status, body)),
        }
    }

    /// Classify a response and decode a success body into `T`.
    ///
    /// Decode failures become [`FailureKind::MessageWithError`] carrying the
    /// decoder error.
    pub fn classify_as<T: DeserializeOwned>(&self, status: Option<u16>, body: Option<&[u8]>) -> Result<T> {
        let bytes = self.classify(status, body)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            let description = format!("Unable to parse response: {e}");
            tracing::debug!(target: "remote_request_net::http", "{}", description);
            FailureKind::message_with_error(e, description)
        })
    }

    fn error_from_body(status: u16, body: &[u8]) -> FailureKind {
        let message = serde_json::from_slice::<SuccessEnvelope>(body)
            .map(|envelope| envelope.message)
            .or_else(|_| serde_json::from_slice::<ErrorEnvelope>(body).map(|envelope| envelope.message))
            .or_else(|_| serde_json::from_slice::<BareErrorEnvelope>(body).map(|envelope| envelope.message));

        match message {
            Ok(message) => {
                let message = message.unwrap_or_default();
                tracing::debug!(target: "remote_request_net::http", status, message = %message, "Response failed");
                FailureKind::Message(message)
            }
            Err(_) => {
                tracing::debug!(target: "remote_request_net::http", status, "Response failed with an undecodable body");
                FailureKind::message(UNDECODABLE_BODY_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_of(result: Result<Bytes>) -> String {
        match result {
            Err(FailureKind::Message(message)) => message,
            other => panic!("expected a message failure, got {other:?}"),
        }
    }

    #[test]
    fn test_success_returns_raw_bytes() {
        let body = b"not json at all";
        let bytes = ResponseClassifier::new().classify(Some(200), Some(body)).unwrap();
        assert_eq!(&bytes[..], body);
    }

    #[test]
    fn test_unauthorized_ignores_body() {
        let result = ResponseClassifier::new().classify(Some(401), Some(br#"{"message":"nope"}"#));
        assert!(matches!(result, Err(FailureKind::Unauthorized)));
    }

    #[test]
    fn test_success_envelope_message() {
        let result = ResponseClassifier::new().classify(Some(500), Some(br#"{"message":"server down"}"#));
        assert_eq!(message_of(result), "server down");
    }

    #[test]
    fn test_error_envelope_with_detail() {
        // `data` as an object does not fit the success envelope.
        let body = br#"{"status":422,"message":"invalid","data":{"all_error_messages":["bad"]}}"#;
        let result = ResponseClassifier::new().classify(Some(422), Some(body));
        assert_eq!(message_of(result), "invalid");
    }

    #[test]
    fn test_bare_error_envelope() {
        // `data` fits neither the success nor the detailed envelope.
        let body = br#"{"message":"bare","data":"text"}"#;
        let result = ResponseClassifier::new().classify(Some(400), Some(body));
        assert_eq!(message_of(result), "bare");
    }

    #[test]
    fn test_missing_message_is_empty() {
        let result = ResponseClassifier::new().classify(Some(404), Some(b"{}"));
        assert_eq!(message_of(result), "");
    }

    #[test]
    fn test_undecodable_body() {
        let result = ResponseClassifier::new().classify(Some(502), Some(b"<html>Bad Gateway</html>"));
        assert_eq!(message_of(result), UNDECODABLE_BODY_MESSAGE);
    }

    #[test]
    fn test_missing_response_and_body() {
        let classifier = ResponseClassifier::new();
        assert!(matches!(classifier.classify(None, Some(b"{}")), Err(FailureKind::InvalidResponse)));
        assert!(matches!(classifier.classify(Some(200), None), Err(FailureKind::NullData)));
    }

    #[test]
    fn test_classify_as_decodes() {
        let value: Vec<u32> = ResponseClassifier::new()
            .classify_as(Some(201), Some(b"[1,2,3]"))
            .unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn test_classify_as_decode_failure_keeps_source() {
        let err = ResponseClassifier::new()
            .classify_as::<Vec<u32>>(Some(200), Some(b"{}"))
            .unwrap_err();
        assert!(matches!(err, FailureKind::MessageWithError { source: Some(_), .. }));
        assert!(err.describe().starts_with("Unable to parse response"));
    }
}
