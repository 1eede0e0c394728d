//! Application configuration and credential storage.
//!
//! The request core reads two things from its environment: the base URL for
//! the active deployment environment, and the credentials placed in the
//! `Authorization` header. Both are reached through [`ConfigProvider`] so the
//! executor never touches global state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use remote_request_net::config::{AppConfig, Configuration, MemoryTokenStore, TokenStore};
//!
//! let app = AppConfig::from_toml_str(r#"
//!     environment = "Development"
//!
//!     [base_urls]
//!     Development = "https://restcountries.com"
//! "#).unwrap();
//!
//! let tokens = Arc::new(MemoryTokenStore::new());
//! tokens.set_bearer_token(Some("secret".to_string()));
//!
//! let config = Configuration::new(app, tokens);
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protected::ProtectedState;

/// Key under which the bearer token is persisted.
pub const BEARER_TOKEN_KEY: &str = "bearerToken";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`AppConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A token file is not a valid JSON object.
    #[error("invalid token store: {0}")]
    TokenStore(#[from] serde_json::Error),
}

/// Deployment environment the application talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    /// A server on the developer's machine.
    Local,
    /// QA test deployment.
    #[serde(rename = "QATesting")]
    QaTesting,
    /// Beta test deployment.
    BetaTesting,
    /// Shared development deployment.
    Development,
    /// Production.
    Production,
    /// No environment selected.
    #[default]
    Unspecified,
}

impl Environment {
    /// All environments, in declaration order.
    pub const ALL: [Environment; 6] = [
        Self::Local,
        Self::QaTesting,
        Self::BetaTesting,
        Self::Development,
        Self::Production,
        Self::Unspecified,
    ];

    /// The name used as the key in the base URL table.
    pub fn mode(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::QaTesting => "QATesting",
            Self::BetaTesting => "BetaTesting",
            Self::Development => "Development",
            Self::Production => "Production",
            Self::Unspecified => "Unspecified",
        }
    }

    /// Look up an environment by its mode name.
    pub fn from_mode(mode: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|env| env.mode() == mode)
            .unwrap_or(Self::Unspecified)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mode())
    }
}

/// How the `Authorization` header is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Bearer <token>` using the token from the [`TokenStore`].
    #[default]
    Bearer,
    /// `Basic <base64(username:password)>`.
    Basic,
    /// No `Authorization` header.
    None,
}

/// Authorization settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Scheme used for every request.
    pub scheme: AuthScheme,
    /// Username for [`AuthScheme::Basic`].
    pub username: String,
    /// Password for [`AuthScheme::Basic`].
    pub password: String,
}

/// Static application configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// The active environment.
    pub environment: Environment,
    /// Base URL per environment mode name.
    pub base_urls: HashMap<String, String>,
    /// Authorization settings.
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Create a configuration for `environment` with no base URLs.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Set the base URL for an environment.
    pub fn with_base_url(mut self, environment: Environment, url: impl Into<String>) -> Self {
        self.base_urls.insert(environment.mode().to_string(), url.into());
        self
    }

    /// Set the authorization settings.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The base URL of the active environment, if configured.
    pub fn base_url(&self) -> Option<&str> {
        self.base_urls
            .get(self.environment.mode())
            .map(String::as_str)
    }
}

/// Read-only source of request configuration.
pub trait ConfigProvider: Send + Sync {
    /// Base URL every endpoint path is appended to.
    fn base_url(&self) -> Option<String>;

    /// Value of the `Authorization` header, or `None` to omit it.
    fn authorization(&self) -> Option<String>;
}

/// Simple string key-value store holding persisted credentials.
pub trait TokenStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value; `None` removes the key.
    fn set(&self, key: &str, value: Option<String>);

    /// The stored bearer token.
    fn bearer_token(&self) -> Option<String> {
        self.get(BEARER_TOKEN_KEY)
    }

    /// Store or clear the bearer token.
    fn set_bearer_token(&self, token: Option<String>) {
        self.set(BEARER_TOKEN_KEY, token);
    }
}

/// A [`TokenStore`] kept in memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: ProtectedState<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<String>) {
        self.values.write(|values| match value {
            Some(value) => {
                values.insert(key.to_string(), value);
            }
            None => {
                values.remove(key);
            }
        });
    }
}

/// A [`TokenStore`] persisted as a flat JSON object on disk.
///
/// Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    values: ProtectedState<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open a store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Ok(Self {
            path,
            values: ProtectedState::new(values),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let result = serde_json::to_vec_pretty(values)
            .map_err(std::io::Error::other)
            .and_then(|bytes| fs::write(&self.path, bytes));
        if let Err(e) = result {
            tracing::warn!(
                target: "remote_request_net::config",
                "Failed to persist token store {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<String>) {
        self.values.write(|values| {
            match value {
                Some(value) => {
                    values.insert(key.to_string(), value);
                }
                None => {
                    values.remove(key);
                }
            }
            self.persist(values);
        });
    }
}

/// The standard [`ConfigProvider`]: an [`AppConfig`] plus a [`TokenStore`].
#[derive(Clone)]
pub struct Configuration {
    app: AppConfig,
    tokens: Arc<dyn TokenStore>,
}

impl Configuration {
    /// Combine static configuration with a token store.
    pub fn new(app: AppConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self { app, tokens }
    }

    /// The static configuration.
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// The token store.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }
}

impl ConfigProvider for Configuration {
    fn base_url(&self) -> Option<String> {
        let url = self.app.base_url().map(str::to_string);
        if url.is_none() {
            tracing::warn!(
                target: "remote_request_net::config",
                "No base URL configured for environment {}",
                self.app.environment
            );
        }
        url
    }

    fn authorization(&self) -> Option<String> {
        match self.app.auth.scheme {
            AuthScheme::Bearer => self
                .tokens
                .bearer_token()
                .filter(|token| !token.is_empty())
                .map(|token| format!("Bearer {token}")),
            AuthScheme::Basic => {
                let credentials = format!("{}:{}", self.app.auth.username, self.app.auth.password);
                Some(format!("Basic {}", STANDARD.encode(credentials)))
            }
            AuthScheme::None => None,
        }
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("environment", &self.app.environment)
            .field("auth_scheme", &self.app.auth.scheme)
            .finish()
    }
}
