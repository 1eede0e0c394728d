//! Tests for the failure taxonomy and shared state.

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::thread;

use remote_request_net::{FailureKind, ProtectedState};

#[test]
fn test_equality_ignores_payload() {
    assert_eq!(FailureKind::message("a"), FailureKind::message("b"));
    assert_eq!(
        FailureKind::network(io::Error::other("one")),
        FailureKind::network(io::Error::other("two"))
    );
    assert_ne!(FailureKind::message("a"), FailureKind::Unauthorized);
    assert_ne!(
        FailureKind::network(io::Error::other("x")),
        FailureKind::unknown(io::Error::other("x"))
    );
}

#[test]
fn test_describe() {
    assert_eq!(FailureKind::message("server down").describe(), "server down");
    assert_eq!(
        FailureKind::message_with_error(io::Error::other("eof"), "Unable to parse response").describe(),
        "Unable to parse response"
    );
    assert_eq!(FailureKind::Unauthorized.describe(), "");
    assert_eq!(FailureKind::network(io::Error::other("x")).describe(), "");
}

#[test]
fn test_source_is_retained() {
    let err = FailureKind::request_failed(io::Error::other("refused"));
    assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("refused"));
    assert!(err.underlying().is_some());
    assert!(FailureKind::NullData.source().is_none());

    let cloned = err.clone();
    assert!(Arc::ptr_eq(err.underlying().unwrap(), cloned.underlying().unwrap()));
}

#[test]
fn test_display() {
    assert_eq!(FailureKind::message("plain").to_string(), "plain");
    assert_eq!(
        FailureKind::network(io::Error::other("reset")).to_string(),
        "Network error: reset"
    );
}

#[test]
fn test_protected_state_serializes_writers() {
    let state = Arc::new(ProtectedState::new(0u64));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    state.write(|value| *value += 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(state.get(), 8000);
}
