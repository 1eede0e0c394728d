//! Turns request descriptions into wire requests.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};

use super::request::{ContentType, Parameters, RequestDescription, WireRequest, stringify};
use crate::config::ConfigProvider;
use crate::error::{FailureKind, Result};

/// Builds [`WireRequest`]s from [`RequestDescription`]s.
///
/// The only inputs besides the description are the base URL and the
/// authorization value supplied by the [`ConfigProvider`].
#[derive(Clone)]
pub struct RequestBuilder {
    config: Arc<dyn ConfigProvider>,
}

impl RequestBuilder {
    /// Create a builder reading from `config`.
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self { config }
    }

    /// Build a request without a multipart boundary.
    pub fn build(&self, description: &RequestDescription) -> Result<WireRequest> {
        self.build_with_boundary(description, None)
    }

    /// Build a request, using `boundary` in a multipart `Content-Type`.
    ///
    /// Multipart bodies are not produced here; see
    /// [`MultipartBody`](super::MultipartBody).
    pub fn build_with_boundary(
        &self,
        description: &RequestDescription,
        boundary: Option<&str>,
    ) -> Result<WireRequest> {
        let url = self.request_url(description)?;
        let method = description.method();

        let mut headers = http::HeaderMap::new();
        if let Some(authorization) = self.config.authorization() {
            let value = HeaderValue::try_from(authorization).map_err(|e| {
                tracing::error!(target: "remote_request_net::http", "Invalid authorization header: {}", e);
                FailureKind::InvalidRequest
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut body = None;
        if let Some(content_type) = description.content_type() {
            let value = HeaderValue::try_from(content_type.header_value(boundary))
                .map_err(|_| FailureKind::InvalidRequest)?;
            headers.insert(CONTENT_TYPE, value);
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

            if !method.uses_query() {
                body = encode_body(description, content_type)?;
            }
        }

        let request = WireRequest {
            method,
            url,
            headers,
            body,
        };
        log_request(&request);
        Ok(request)
    }

    fn request_url(&self, description: &RequestDescription) -> Result<url::Url> {
        let base = self.config.base_url().ok_or(FailureKind::InvalidUrl)?;
        let mut full = format!("{}/{}", base.trim_end_matches('/'), description.endpoint().path());
        if let Some(suffix) = description.path_suffix() {
            full = format!("{}/{}", full, suffix.trim_start_matches('/'));
        }

        let mut url = url::Url::parse(&full).map_err(|e| {
            tracing::error!(target: "remote_request_net::http", "Invalid request URL {}: {}", full, e);
            FailureKind::InvalidUrl
        })?;

        if description.method().uses_query()
            && let Some(params) = description.params()
            && !params.is_empty()
        {
            let mut query = percent_encode_pairs(params);
            if let Some(existing) = url.query().filter(|q| !q.is_empty()) {
                query = format!("{query}&{existing}");
            }
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder").finish_non_exhaustive()
    }
}

fn encode_body(description: &RequestDescription, content_type: ContentType) -> Result<Option<Bytes>> {
    match content_type {
        ContentType::Json => match description.params() {
            Some(params) => {
                let bytes = serde_json::to_vec(params).map_err(|e| {
                    tracing::error!(target: "remote_request_net::http", "Failed to serialize JSON body: {}", e);
                    FailureKind::Encoding
                })?;
                Ok(Some(Bytes::from(bytes)))
            }
            None => Ok(None),
        },
        ContentType::Form => Ok(description
            .params()
            .map(|params| Bytes::from(percent_encode_pairs(params)))),
        ContentType::Data => match description.body() {
            Some(body) => Ok(Some(body.clone())),
            None => {
                tracing::error!(target: "remote_request_net::http", "Data request has no body");
                Err(FailureKind::NullData)
            }
        },
        ContentType::Multipart => Ok(None),
    }
}

/// Encode parameters as `key=value` pairs joined by `&`.
///
/// Keys and values are percent-encoded leaving only RFC 3986 unreserved
/// characters as-is.
pub fn percent_encode_pairs(params: &Parameters) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&stringify(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn log_request(request: &WireRequest) {
    if !tracing::enabled!(target: "remote_request_net::http", tracing::Level::DEBUG) {
        return;
    }
    let header_names: Vec<&str> = request.headers.keys().map(|name| name.as_str()).collect();
    tracing::debug!(
        target: "remote_request_net::http",
        method = %request.method,
        url = %request.url,
        headers = ?header_names,
        body_len = request.body.as_ref().map_or(0, Bytes::len),
        "Built request"
    );
}
