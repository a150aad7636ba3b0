//! Builder configuration.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use turbo_backend::{BackendClient, Transport};
use turbo_observability::{LogFormat, LogLevel, LogSink, SessionId, SessionLogger};

use crate::catalogue::find_preset;
use crate::render::Breakpoint;
use crate::store::DEFAULT_HISTORY_LIMIT;

/// Builder configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Editor behaviour.
    #[serde(default)]
    pub editor: EditorConfig,

    /// Session logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Managed backend; without it the builder works offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,
}

impl BuilderConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path))?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.editor.history_limit == 0 {
            bail!("editor.history_limit must be at least 1");
        }
        if find_preset(&self.editor.default_row_preset).is_none() {
            bail!(
                "editor.default_row_preset: unknown preset {:?}",
                self.editor.default_row_preset
            );
        }
        if let Some(backend) = &self.backend {
            backend.validate()?;
        }
        Ok(())
    }

    /// Logger for a new session, as configured.
    pub fn logger(&self, session_id: SessionId) -> SessionLogger {
        let sink = match self.logging.sink {
            SinkKind::Stderr => LogSink::Stderr,
            SinkKind::Tracing => LogSink::Tracing,
            SinkKind::Off => LogSink::Off,
        };
        SessionLogger::new(session_id)
            .with_min_level(self.logging.level)
            .with_format(self.logging.format)
            .with_sink(sink)
    }
}

/// Editor behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Snapshots kept for undo.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Layout of rows added without an explicit preset.
    #[serde(default = "default_row_preset")]
    pub default_row_preset: String,

    /// Breakpoint the canvas opens on.
    #[serde(default)]
    pub default_breakpoint: Breakpoint,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_row_preset() -> String {
    "1/1".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            default_row_preset: default_row_preset(),
            default_breakpoint: Breakpoint::default(),
        }
    }
}

/// Where session logs go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stderr,
    Tracing,
    Off,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level emitted.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub sink: SinkKind,
}

/// Managed backend project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,

    /// API key, inline. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Table storing page documents.
    #[serde(default = "default_pages_table")]
    pub pages_table: String,

    /// Bucket receiving uploaded images.
    #[serde(default = "default_images_bucket")]
    pub images_bucket: String,

    /// Tenant the pages belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

fn default_pages_table() -> String {
    "landing_pages".to_string()
}

fn default_images_bucket() -> String {
    "landing-images".to_string()
}

impl BackendConfig {
    /// A config for `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_key_env: None,
            pages_table: default_pages_table(),
            images_bucket: default_images_bucket(),
            store_id: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            bail!("backend.base_url must be an http(s) URL, got {:?}", self.base_url);
        }
        if self.api_key.is_none() && self.api_key_env.is_none() {
            bail!("backend needs api_key or api_key_env");
        }
        if self.pages_table.is_empty() || self.images_bucket.is_empty() {
            bail!("backend.pages_table and backend.images_bucket must not be empty");
        }
        Ok(())
    }

    /// The API key, inline or from the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        let var = self
            .api_key_env
            .as_deref()
            .context("backend needs api_key or api_key_env")?;
        std::env::var(var).with_context(|| format!("Environment variable {} is not set", var))
    }

    /// Client for this project over `transport`.
    pub fn client(&self, transport: Arc<dyn Transport>) -> Result<BackendClient> {
        self.validate()?;
        Ok(BackendClient::new(
            self.base_url.clone(),
            self.resolve_api_key()?,
            transport,
        ))
    }
}
