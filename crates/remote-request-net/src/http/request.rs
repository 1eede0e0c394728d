//! Declarative request descriptions and the wire requests built from them.

use bytes::Bytes;
use serde_json::{Map, Value};

use super::endpoint::Endpoint;
use crate::error::{FailureKind, Result};

/// Request parameters: query items, JSON fields, form fields or multipart
/// text parts depending on the method and content type.
pub type Parameters = Map<String, Value>;

/// HTTP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP PATCH method.
    Patch,
}

impl HttpMethod {
    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
        }
    }

    /// Whether parameters travel in the query string instead of the body.
    pub fn uses_query(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }

    /// The method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the request body is encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Parameters serialized as a JSON object.
    Json,
    /// Caller-supplied bytes sent verbatim.
    Data,
    /// Parameters percent-encoded as `key=value&...`.
    Form,
    /// Parameters and media parts as `multipart/form-data`.
    Multipart,
}

impl ContentType {
    /// The `Content-Type` header value.
    ///
    /// `boundary` is only used for [`ContentType::Multipart`].
    pub fn header_value(self, boundary: Option<&str>) -> String {
        match self {
            Self::Json | Self::Data => "application/json".to_string(),
            Self::Form => "application/x-www-form-urlencoded".to_string(),
            Self::Multipart => match boundary {
                Some(boundary) => format!("multipart/form-data; boundary={boundary}"),
                None => "multipart/form-data".to_string(),
            },
        }
    }
}

/// Form field name of an uploaded media part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKey {
    /// Voice recording attached to a profile.
    BioVoice,
    /// Image or generic file.
    File,
}

impl MediaKey {
    /// The multipart field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BioVoice => "bioVoice",
            Self::File => "image",
        }
    }
}

/// MIME type of an uploaded media part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaMime {
    /// `image/jpeg`
    ImageJpeg,
    /// `image/png`
    ImagePng,
    /// `video/mp4`
    VideoMp4,
    /// `video/quicktime`
    VideoMov,
    /// `audio/mp3`
    Audio,
}

impl MediaMime {
    /// The MIME type string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageJpeg => "image/jpeg",
            Self::ImagePng => "image/png",
            Self::VideoMp4 => "video/mp4",
            Self::VideoMov => "video/quicktime",
            Self::Audio => "audio/mp3",
        }
    }
}

/// A binary part of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaPart {
    /// File name reported to the server.
    pub filename: String,
    /// Raw file contents.
    pub data: Bytes,
    /// Form field name.
    pub key: MediaKey,
    /// MIME type.
    pub mime: MediaMime,
}

impl MediaPart {
    /// Create a media part.
    pub fn new(
        filename: impl Into<String>,
        data: impl Into<Bytes>,
        key: MediaKey,
        mime: MediaMime,
    ) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
            key,
            mime,
        }
    }
}

/// An immutable description of one request.
///
/// Built with [`RequestDescription::builder`]; consumed by the request
/// builder and executor.
#[derive(Clone, Debug)]
pub struct RequestDescription {
    endpoint: Endpoint,
    method: HttpMethod,
    content_type: Option<ContentType>,
    body: Option<Bytes>,
    params: Option<Parameters>,
    media: Vec<MediaPart>,
    silent: bool,
    path_suffix: Option<String>,
}

impl RequestDescription {
    /// Start describing a request to `endpoint`.
    pub fn builder(endpoint: Endpoint, method: HttpMethod) -> RequestDescriptionBuilder {
        RequestDescriptionBuilder {
            endpoint,
            method,
            content_type: None,
            body: None,
            params: None,
            media: Vec::new(),
            silent: false,
            path_suffix: None,
        }
    }

    /// Target endpoint.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Body encoding, if any.
    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// Raw body for [`ContentType::Data`].
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Parameters, if any.
    pub fn params(&self) -> Option<&Parameters> {
        self.params.as_ref()
    }

    /// Media parts for [`ContentType::Multipart`].
    pub fn media(&self) -> &[MediaPart] {
        &self.media
    }

    /// Whether the loading indicator is suppressed.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Extra path segment appended after the endpoint path.
    pub fn path_suffix(&self) -> Option<&str> {
        self.path_suffix.as_deref()
    }
}

/// Builder for [`RequestDescription`].
#[derive(Debug)]
pub struct RequestDescriptionBuilder {
    endpoint: Endpoint,
    method: HttpMethod,
    content_type: Option<ContentType>,
    body: Option<Bytes>,
    params: Option<Parameters>,
    media: Vec<MediaPart>,
    silent: bool,
    path_suffix: Option<String>,
}

impl RequestDescriptionBuilder {
    /// Set the body encoding.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Set the raw body used with [`ContentType::Data`].
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the raw body by serializing a value as JSON.
    pub fn json_body<T: serde::Serialize>(mut self, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            tracing::error!(target: "remote_request_net::http", "Failed to serialize JSON body: {}", e);
            FailureKind::Encoding
        })?;
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Add one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Parameters::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace all parameters.
    pub fn params(mut self, params: Parameters) -> Self {
        self.params = Some(params);
        self
    }

    /// Add a media part.
    pub fn media(mut self, part: MediaPart) -> Self {
        self.media.push(part);
        self
    }

    /// Suppress the loading indicator for this request.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Append an extra path segment after the endpoint path.
    pub fn path_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.path_suffix = Some(suffix.into());
        self
    }

    /// Finish the description.
    ///
    /// Fails with [`FailureKind::NullData`] when the content type is
    /// [`ContentType::Data`] and no body was supplied.
    pub fn build(self) -> Result<RequestDescription> {
        if self.content_type == Some(ContentType::Data) && self.body.is_none() {
            return Err(FailureKind::NullData);
        }
        Ok(RequestDescription {
            endpoint: self.endpoint,
            method: self.method,
            content_type: self.content_type,
            body: self.body,
            params: self.params,
            media: self.media,
            silent: self.silent,
            path_suffix: self.path_suffix,
        })
    }
}

/// A concrete request ready for the transport.
#[derive(Clone, Debug)]
pub struct WireRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Fully resolved URL including the query string.
    pub url: url::Url,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Body bytes. `None` for bodiless requests and for multipart, whose body
    /// the executor streams separately.
    pub body: Option<Bytes>,
}

impl WireRequest {
    /// Get a header value as a string.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Render a parameter value as text.
///
/// Strings are used as-is; every other JSON value uses its JSON rendering.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
