//! # Application State
//!
//! Shared state for the Axum application, passed to route handlers via the
//! `State` extractor, plus the environment-driven [`AppConfig`].
//!
//! AppState holds only the command dispatcher, configuration and the
//! metrics handle. User data is owned by whatever sits behind the dispatcher.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use userdesk_core::{CommandDispatcher, InMemoryUserDirectory, UserId};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Receives every command built by the API.
    pub dispatcher: Arc<dyn CommandDispatcher>,
    /// Configuration the application was started with.
    pub config: AppConfig,
    /// Prometheus handle; `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State with default configuration and an empty in-memory directory.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), Arc::new(InMemoryUserDirectory::new()))
    }

    /// State with the given configuration and dispatcher.
    pub fn with_config(config: AppConfig, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self {
            dispatcher,
            config,
            metrics: None,
        }
    }

    /// Attach the handle used to render `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("dispatcher", &"<dyn CommandDispatcher>")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

// -- Configuration ------------------------------------------------------------

/// Configuration errors raised while reading the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `PORT` is not a valid u16.
    #[error("invalid PORT: {0:?}")]
    InvalidPort(String),

    /// A `SEED_USERS` entry is not `uuid=email`.
    #[error("invalid SEED_USERS entry: {0:?} (expected uuid=email)")]
    InvalidSeed(String),
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer-token secret. If `None`, tokens carry only the user id.
    pub auth_secret: Option<String>,
    /// Users loaded into the development directory at startup.
    pub seed_users: Vec<(UserId, String)>,
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN` and `SEED_USERS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let auth_secret = lookup("AUTH_TOKEN").filter(|s| !s.is_empty());

        let seed_users = match lookup("SEED_USERS") {
            Some(raw) => parse_seed_users(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            port,
            auth_secret,
            seed_users,
        })
    }
}

/// Parse `uuid=email,uuid=email`. Blank entries are skipped.
fn parse_seed_users(raw: &str) -> Result<Vec<(UserId, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(UserId, String), ConfigError> {
            let (id, email) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidSeed(entry.to_string()))?;
            let id = UserId::parse(id.trim())
                .map_err(|_| ConfigError::InvalidSeed(entry.to_string()))?;
            Ok((id, email.trim().to_string()))
        })
        .collect()
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_secret",
                &self.auth_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("seed_users", &self.seed_users.len())
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_secret: None,
            seed_users: Vec::new(),
        }
    }
}
