//! `multipart/form-data` body construction.

use bytes::{BufMut, Bytes, BytesMut};

use super::request::{MediaPart, Parameters, stringify};

/// A multipart body under construction.
///
/// Text parts come first, then media parts, then the closing boundary. Each
/// part starts with `\r\n--<boundary>\r\n`.
///
/// # Example
///
/// ```
/// use remote_request_net::http::MultipartBody;
///
/// let body = MultipartBody::new("XYZ").text("name", "John").finish();
/// let text = String::from_utf8(body.to_vec()).unwrap();
/// assert!(text.ends_with("\r\n--XYZ--\r\n"));
/// ```
#[derive(Debug)]
pub struct MultipartBody {
    boundary: String,
    buffer: BytesMut,
}

impl MultipartBody {
    /// Start a body delimited by `boundary`.
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buffer: BytesMut::new(),
        }
    }

    /// Generate a fresh boundary token.
    pub fn generate_boundary() -> String {
        uuid::Uuid::new_v4().to_string().to_uppercase()
    }

    /// The boundary token.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.put_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"));
        self.put_str(value);
        self
    }

    /// Append every parameter as a text field.
    pub fn params(self, params: &Parameters) -> Self {
        params
            .iter()
            .fold(self, |body, (key, value)| body.text(key, &stringify(value)))
    }

    /// Append a binary media part.
    pub fn media(mut self, part: &MediaPart) -> Self {
        self.open_part();
        self.put_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            part.key.as_str(),
            part.filename
        ));
        self.put_str(&format!("Content-Type: {}\r\n\r\n", part.mime.as_str()));
        self.buffer.put_slice(&part.data);
        self
    }

    /// Append the closing boundary and return the body.
    pub fn finish(mut self) -> Bytes {
        let closing = format!("\r\n--{}--\r\n", self.boundary);
        self.put_str(&closing);
        self.buffer.freeze()
    }

    /// Build a complete body from parameters and media parts.
    pub fn encode(boundary: &str, params: Option<&Parameters>, media: &[MediaPart]) -> Bytes {
        let mut body = Self::new(boundary);
        if let Some(params) = params {
            body = body.params(params);
        }
        media.iter().fold(body, |body, part| body.media(part)).finish()
    }

    fn open_part(&mut self) {
        let opening = format!("\r\n--{}\r\n", self.boundary);
        self.put_str(&opening);
    }

    fn put_str(&mut self, s: &str) {
        self.buffer.put_slice(s.as_bytes());
    }
}
