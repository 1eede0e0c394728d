//! Streaming upload bodies with progress reporting.

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::broadcast;

/// Size of the chunks an upload body is streamed in (64 KiB).
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Capacity of the shared progress channel.
pub(crate) const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Progress of an upload.
///
/// Progress values are shared by every upload of an executor and carry no
/// upload identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes handed to the transport so far.
    pub bytes_sent: u64,
    /// Size of the whole body.
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Completed fraction in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            (self.bytes_sent as f64 / self.total_bytes as f64).min(1.0)
        }
    }

    /// Completed percentage in `0..=100`.
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0) as u8
    }
}

/// Wrap `body` in a streaming request body that reports progress as each
/// chunk is pulled by the transport.
pub(crate) fn progress_body(body: Bytes, progress: broadcast::Sender<UploadProgress>) -> reqwest::Body {
    let total_bytes = body.len() as u64;
    let chunks: Vec<Bytes> = (0..body.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| body.slice(start..(start + UPLOAD_CHUNK_SIZE).min(body.len())))
        .collect();

    let mut bytes_sent = 0u64;
    let stream = stream::iter(chunks).map(move |chunk| {
        bytes_sent += chunk.len() as u64;
        // No subscribers is fine.
        let _ = progress.send(UploadProgress {
            bytes_sent,
            total_bytes,
        });
        Ok::<_, std::io::Error>(chunk)
    });

    reqwest::Body::wrap_stream(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let progress = UploadProgress {
            bytes_sent: 25,
            total_bytes: 100,
        };
        assert!((progress.fraction() - 0.25).abs() < f64::EPSILON);
        assert_eq!(progress.percent(), 25);
    }

    #[test]
    fn test_fraction_of_empty_body() {
        let progress = UploadProgress {
            bytes_sent: 0,
            total_bytes: 0,
        };
        assert_eq!(progress.fraction(), 1.0);
    }
}
