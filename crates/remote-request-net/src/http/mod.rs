//! HTTP requests: description, building, transport, classification and
//! execution.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use remote_request_net::config::{AppConfig, Configuration, Environment, MemoryTokenStore};
//! use remote_request_net::http::{
//!     AllCountries, Endpoint, HttpMethod, RequestDescription, RequestExecutor,
//! };
//!
//! # async fn run() -> remote_request_net::Result<()> {
//! let app = AppConfig::new(Environment::Production)
//!     .with_base_url(Environment::Production, "https://restcountries.com");
//! let config = Arc::new(Configuration::new(app, Arc::new(MemoryTokenStore::new())));
//!
//! let executor = RequestExecutor::builder(config).build()?;
//! let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get)
//!     .param("fields", "name,flags")
//!     .build()?;
//!
//! let countries: AllCountries = executor.data_task(description).await?;
//! println!("{} countries", countries.len());
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod endpoint;
mod executor;
mod models;
mod multipart;
mod request;
mod response;
mod upload;

pub use builder::{RequestBuilder, percent_encode_pairs};
pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use endpoint::Endpoint;
pub use executor::{PendingResult, RequestExecutor, RequestExecutorBuilder};
pub use models::{AllCountries, CountryDetails, CountryName, Flag};
pub use multipart::MultipartBody;
pub use request::{
    ContentType, HttpMethod, MediaKey, MediaMime, MediaPart, Parameters, RequestDescription,
    RequestDescriptionBuilder, WireRequest,
};
pub use response::{
    BareErrorEnvelope, ErrorDetail, ErrorEnvelope, ResponseClassifier, SuccessEnvelope,
    UNDECODABLE_BODY_MESSAGE,
};
pub use upload::{UPLOAD_CHUNK_SIZE, UploadProgress};
