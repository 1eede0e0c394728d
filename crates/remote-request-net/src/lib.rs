//! Transport-layer HTTP client core.
//!
//! This crate builds requests from declarative descriptions, sends them,
//! classifies responses and failures uniformly, and watches network
//! reachability while requests are in flight:
//!
//! - **[`http`]**: request descriptions, the request builder, the response
//!   classifier and the [`RequestExecutor`](http::RequestExecutor).
//! - **[`reachability`]**: reachability flags, status and the
//!   [`ConnectivityMonitor`](reachability::ConnectivityMonitor).
//! - **[`config`]**: environments, base URLs and credentials.
//! - **[`ui`]**: the loading and connectivity callbacks an application
//!   implements.
//!
//! Every request ends in exactly one [`Result`], whose error side is a
//! [`FailureKind`].
//!
//! # Fetching
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use remote_request_net::config::{AppConfig, Configuration, Environment, MemoryTokenStore};
//! use remote_request_net::http::{Endpoint, HttpMethod, RequestDescription, RequestExecutor};
//! use remote_request_net::reachability::ConnectivityMonitor;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let app = AppConfig::new(Environment::Development)
//!     .with_base_url(Environment::Development, "https://api.example.com");
//! let config = Arc::new(Configuration::new(app, Arc::new(MemoryTokenStore::new())));
//!
//! let executor = RequestExecutor::builder(config)
//!     .monitor(ConnectivityMonitor::system()?)
//!     .build()?;
//!
//! let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Get).build()?;
//! let body: serde_json::Value = executor.data_task(description).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Uploading
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use remote_request_net::config::{AppConfig, Configuration, Environment, MemoryTokenStore};
//! use remote_request_net::http::{
//!     ContentType, Endpoint, HttpMethod, MediaKey, MediaMime, MediaPart, RequestDescription,
//!     RequestExecutor,
//! };
//!
//! # async fn run(executor: RequestExecutor) -> remote_request_net::Result<()> {
//! let mut progress = executor.progress();
//! tokio::spawn(async move {
//!     while let Ok(update) = progress.recv().await {
//!         println!("{}%", update.percent());
//!     }
//! });
//!
//! let description = RequestDescription::builder(Endpoint::AllCountries, HttpMethod::Post)
//!     .content_type(ContentType::Multipart)
//!     .param("reqtype", "fileupload")
//!     .media(MediaPart::new("photo.png", vec![0u8; 1024], MediaKey::File, MediaMime::ImagePng))
//!     .build()?;
//! let reply: serde_json::Value = executor.upload_task(description).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod http;
mod protected;
pub mod reachability;
pub mod runtime;
pub mod ui;

pub use error::{FailureKind, ReachabilityError, Result, Underlying};
pub use protected::ProtectedState;

// Re-export commonly used types at the crate root
pub use config::{AppConfig, ConfigProvider, Configuration, Environment};
pub use http::{
    HttpClient, HttpMethod, PendingResult, RequestDescription, RequestExecutor, UploadProgress,
};
pub use reachability::{ConnectivityMonitor, ReachabilityStatus};
pub use ui::{NoopUi, UiDelegate};
