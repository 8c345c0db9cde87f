use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::{expand_path, home_dir};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CHAT_MODEL, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_PROVIDER_BASE_URL, DEFAULT_PROVIDER_TIMEOUT_SECS,
    DEFAULT_TELEMETRY_APPEND_TIMEOUT_MS, DEFAULT_TRANSCRIPTION_MODEL, DEFAULT_USD_PER_1K_TOKENS,
};

// =============================================================================
// Telemetry Sink Backend Enum
// =============================================================================

/// Durable store backing the telemetry sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    #[default]
    Sqlite,
    /// Process-local store, lost on restart
    Memory,
}

impl fmt::Display for SinkBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkBackend::Sqlite => write!(f, "sqlite"),
            SinkBackend::Memory => write!(f, "memory"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON config file)
// =============================================================================

/// Server configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Provider configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProviderFileConfig {
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub transcription_model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Pricing configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PricingFileConfig {
    pub usd_per_1k_tokens: Option<f64>,
}

/// Telemetry configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TelemetryFileConfig {
    pub backend: Option<SinkBackend>,
    pub append_timeout_ms: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub provider: Option<ProviderFileConfig>,
    pub pricing: Option<PricingFileConfig>,
    pub telemetry: Option<TelemetryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(provider) = other.provider {
            let current = self
                .provider
                .get_or_insert_with(ProviderFileConfig::default);
            if provider.base_url.is_some() {
                current.base_url = provider.base_url;
            }
            if provider.chat_model.is_some() {
                current.chat_model = provider.chat_model;
            }
            if provider.transcription_model.is_some() {
                current.transcription_model = provider.transcription_model;
            }
            if provider.timeout_secs.is_some() {
                current.timeout_secs = provider.timeout_secs;
            }
        }

        if let Some(pricing) = other.pricing {
            let current = self.pricing.get_or_insert_with(PricingFileConfig::default);
            if pricing.usd_per_1k_tokens.is_some() {
                tracing::trace!(
                    usd_per_1k_tokens = ?pricing.usd_per_1k_tokens,
                    "Merging pricing.usd_per_1k_tokens"
                );
                current.usd_per_1k_tokens = pricing.usd_per_1k_tokens;
            }
        }

        if let Some(telemetry) = other.telemetry {
            let current = self
                .telemetry
                .get_or_insert_with(TelemetryFileConfig::default);
            if telemetry.backend.is_some() {
                current.backend = telemetry.backend;
            }
            if telemetry.append_timeout_ms.is_some() {
                current.append_timeout_ms = telemetry.append_timeout_ms;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// External AI provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}

/// Usage pricing configuration
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    pub usd_per_1k_tokens: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            usd_per_1k_tokens: DEFAULT_USD_PER_1K_TOKENS,
        }
    }
}

/// Telemetry sink configuration
#[derive(Debug, Clone, Copy)]
pub struct TelemetryConfig {
    pub backend: SinkBackend,
    pub append_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            backend: SinkBackend::default(),
            append_timeout: Duration::from_millis(DEFAULT_TELEMETRY_APPEND_TIMEOUT_MS),
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub pricing: PricingConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.medassist/medassist.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_provider = file_config.provider.unwrap_or_default();
        let file_pricing = file_config.pricing.unwrap_or_default();
        let file_telemetry = file_config.telemetry.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let defaults = ProviderConfig::default();
        let provider = ProviderConfig {
            base_url: cli
                .provider_base_url
                .clone()
                .or(file_provider.base_url)
                .unwrap_or(defaults.base_url),
            chat_model: cli
                .provider_chat_model
                .clone()
                .or(file_provider.chat_model)
                .unwrap_or(defaults.chat_model),
            transcription_model: file_provider
                .transcription_model
                .unwrap_or(defaults.transcription_model),
            timeout: file_provider
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        let pricing = PricingConfig {
            usd_per_1k_tokens: cli
                .pricing_usd_per_1k
                .or(file_pricing.usd_per_1k_tokens)
                .unwrap_or(DEFAULT_USD_PER_1K_TOKENS),
        };

        let telemetry = TelemetryConfig {
            backend: cli
                .telemetry_backend
                .or(file_telemetry.backend)
                .unwrap_or_default(),
            append_timeout: Duration::from_millis(
                cli.telemetry_append_timeout_ms
                    .or(file_telemetry.append_timeout_ms)
                    .unwrap_or(DEFAULT_TELEMETRY_APPEND_TIMEOUT_MS),
            ),
        };

        tracing::debug!(
            host = %server.host,
            port = server.port,
            chat_model = %provider.chat_model,
            usd_per_1k_tokens = pricing.usd_per_1k_tokens,
            telemetry_backend = %telemetry.backend,
            "Configuration resolved"
        );

        Self {
            server,
            provider,
            pricing,
            telemetry,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.pricing.usd_per_1k_tokens.is_finite() || self.pricing.usd_per_1k_tokens < 0.0 {
            anyhow::bail!(
                "pricing.usd_per_1k_tokens must be a non-negative number, got {}",
                self.pricing.usd_per_1k_tokens
            );
        }
        if self.telemetry.append_timeout.is_zero() {
            anyhow::bail!("telemetry.append_timeout_ms must be greater than 0");
        }
        reqwest::Url::parse(&self.provider.base_url).with_context(|| {
            format!("Invalid provider.base_url: {}", self.provider.base_url)
        })?;
        Ok(())
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
