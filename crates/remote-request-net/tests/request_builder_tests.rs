//! Tests for turning request descriptions into wire requests.

use std::sync::Arc;

use remote_request_net::FailureKind;
use remote_request_net::config::{
    AppConfig, AuthConfig, AuthScheme, Configuration, Environment, MemoryTokenStore, TokenStore,
};
use remote_request_net::http::{
    ContentType, Endpoint, HttpMethod, MediaKey, MediaMime, MediaPart, MultipartBody,
    RequestBuilder, RequestDescription,
};
use serde_json::json;

const BASE: &str = "https://api.example.com";

fn builder_with(base: Option<&str>, token: Option<&str>) -> RequestBuilder {
    let mut app = AppConfig::new(Environment::Development);
    if let Some(base) = base {
        app = app.with_base_url(Environment::Development, base);
    }
    let tokens = Arc::new(MemoryTokenStore::new());
    tokens.set_bearer_token(token.map(str::to_string));
    RequestBuilder::new(Arc::new(Configuration::new(app, tokens)))
}

fn builder() -> RequestBuilder {
    builder_with(Some(BASE), None)
}

#[test]
fn test_get_params_become_query() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .content_type(ContentType::Json)
        .param("q", "a b")
        .param("n", 1)
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();

    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url.path(), "/v3.1/all");
    let mut pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![("n".to_string(), "1".to_string()), ("q".to_string(), "a b".to_string())]
    );
    assert!(request.url.query().unwrap().contains("q=a%20b"));
    assert!(request.body.is_none());
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[test]
fn test_delete_params_become_query() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Delete)
        .param("id", "42")
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    assert_eq!(request.url.query(), Some("id=42"));
    assert!(request.body.is_none());
}

#[test]
fn test_get_without_params_has_no_query() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    assert_eq!(request.url.as_str(), "https://api.example.com/v3.1/all");
    assert!(request.url.query().is_none());
}

#[test]
fn test_existing_query_items_are_kept() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .param("fields", "name")
        .path_suffix("search?lang=en")
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    assert_eq!(request.url.path(), "/v3.1/all/search");
    assert_eq!(request.url.query(), Some("fields=name&lang=en"));
}

#[test]
fn test_path_suffix_is_appended() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .path_suffix("42")
        .build()
        .unwrap();

    let request = builder_with(Some("https://api.example.com/"), None)
        .build(&description)
        .unwrap();
    assert_eq!(request.url.as_str(), "https://api.example.com/v3.1/all/42");
}

#[test]
fn test_post_json_body() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
        .content_type(ContentType::Json)
        .param("name", "John")
        .param("age", 30)
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
    assert_eq!(body, json!({"name": "John", "age": 30}));
    assert!(request.url.query().is_none());
}

#[test]
fn test_post_form_body() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Put)
        .content_type(ContentType::Form)
        .param("user", "a&b")
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    assert_eq!(request.body.as_deref(), Some(&b"user=a%26b"[..]));
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn test_data_body_is_verbatim() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Patch)
        .content_type(ContentType::Data)
        .body(&b"{\"raw\":true}"[..])
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    assert_eq!(request.body.as_deref(), Some(&b"{\"raw\":true}"[..]));
    assert_eq!(request.header("content-type"), Some("application/json"));
}

#[test]
fn test_data_without_body_is_null_data() {
    let result = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
        .content_type(ContentType::Data)
        .build();
    assert_eq!(result.unwrap_err(), FailureKind::NullData);
}

#[test]
fn test_json_body_helper() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
        .content_type(ContentType::Data)
        .json_body(&json!({"id": 7}))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(description.body().map(|b| &b[..]), Some(&b"{\"id\":7}"[..]));
}

#[test]
fn test_no_content_type_means_no_body_headers() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
        .param("ignored", true)
        .build()
        .unwrap();

    let request = builder().build(&description).unwrap();
    assert_eq!(request.method, HttpMethod::Post);
    assert!(request.body.is_none());
    assert!(request.header("content-type").is_none());
    assert!(request.header("accept").is_none());
}

#[test]
fn test_multipart_header_uses_boundary() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
        .content_type(ContentType::Multipart)
        .param("reqtype", "fileupload")
        .build()
        .unwrap();

    let request = builder()
        .build_with_boundary(&description, Some("XYZ"))
        .unwrap();
    assert_eq!(
        request.header("content-type"),
        Some("multipart/form-data; boundary=XYZ")
    );
    assert!(request.body.is_none());
}

#[test]
fn test_bearer_token_header() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .build()
        .unwrap();

    let request = builder_with(Some(BASE), Some("abc123"))
        .build(&description)
        .unwrap();
    assert_eq!(request.header("authorization"), Some("Bearer abc123"));
}

#[test]
fn test_empty_token_means_no_header() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .build()
        .unwrap();

    for token in [None, Some("")] {
        let request = builder_with(Some(BASE), token).build(&description).unwrap();
        assert!(request.header("authorization").is_none());
    }
}

#[test]
fn test_basic_auth_header() {
    let app = AppConfig::new(Environment::Production)
        .with_base_url(Environment::Production, BASE)
        .with_auth(AuthConfig {
            scheme: AuthScheme::Basic,
            username: "user".to_string(),
            password: "pass".to_string(),
        });
    let builder = RequestBuilder::new(Arc::new(Configuration::new(
        app,
        Arc::new(MemoryTokenStore::new()),
    )));
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .build()
        .unwrap();

    let request = builder.build(&description).unwrap();
    assert_eq!(request.header("authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[test]
fn test_missing_or_malformed_base_url() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
        .build()
        .unwrap();

    assert_eq!(
        builder_with(None, None).build(&description).unwrap_err(),
        FailureKind::InvalidUrl
    );
    assert_eq!(
        builder_with(Some("not a url"), None)
            .build(&description)
            .unwrap_err(),
        FailureKind::InvalidUrl
    );
}

#[test]
fn test_multipart_sections() {
    let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
        .content_type(ContentType::Multipart)
        .param("a", "1")
        .param("b", "2")
        .media(MediaPart::new("v.mp3", vec![9u8; 4], MediaKey::BioVoice, MediaMime::Audio))
        .media(MediaPart::new("p.jpg", vec![7u8; 4], MediaKey::File, MediaMime::ImageJpeg))
        .media(MediaPart::new("m.mov", vec![5u8; 4], MediaKey::File, MediaMime::VideoMov))
        .build()
        .unwrap();

    let body = MultipartBody::encode("BOUNDARY", description.params(), description.media());
    let text = String::from_utf8_lossy(&body);

    // Two parameters plus three media parts.
    assert_eq!(text.matches("\r\n--BOUNDARY\r\n").count(), 5);
    assert!(text.ends_with("\r\n--BOUNDARY--\r\n"));
    assert_eq!(text.matches("--BOUNDARY--").count(), 1);
    assert!(text.contains("name=\"bioVoice\"; filename=\"v.mp3\"\r\nContent-Type: audio/mp3\r\n\r\n"));
    assert!(text.contains("Content-Type: video/quicktime"));
    assert!(text.contains("name=\"a\"\r\n\r\n1"));
}
