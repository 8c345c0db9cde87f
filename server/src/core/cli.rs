use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::SinkBackend;
use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_PORT, ENV_PRICING_USD_PER_1K, ENV_PROVIDER_BASE_URL,
    ENV_PROVIDER_CHAT_MODEL, ENV_TELEMETRY_APPEND_TIMEOUT_MS, ENV_TELEMETRY_BACKEND,
};

#[derive(Parser)]
#[command(name = "medassist")]
#[command(version, about = "Medical transcription, extraction and diagnosis API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// OpenAI-compatible API base URL
    #[arg(long, global = true, env = ENV_PROVIDER_BASE_URL)]
    pub provider_base_url: Option<String>,

    /// Chat completion model used for extraction and diagnosis
    #[arg(long, global = true, env = ENV_PROVIDER_CHAT_MODEL)]
    pub provider_chat_model: Option<String>,

    /// Price in USD per thousand tokens
    #[arg(long, global = true, env = ENV_PRICING_USD_PER_1K)]
    pub pricing_usd_per_1k: Option<f64>,

    /// Telemetry sink backend (sqlite or memory)
    #[arg(long, global = true, env = ENV_TELEMETRY_BACKEND, value_parser = parse_sink_backend)]
    pub telemetry_backend: Option<SinkBackend>,

    /// Upper bound for one telemetry append, in milliseconds
    #[arg(long, global = true, env = ENV_TELEMETRY_APPEND_TIMEOUT_MS)]
    pub telemetry_append_timeout_ms: Option<u64>,
}

/// Parse telemetry sink backend from CLI/env string
fn parse_sink_backend(s: &str) -> Result<SinkBackend, String> {
    match s.to_lowercase().as_str() {
        "sqlite" => Ok(SinkBackend::Sqlite),
        "memory" => Ok(SinkBackend::Memory),
        _ => Err(format!(
            "Invalid telemetry backend '{}'. Valid options: sqlite, memory",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub provider_base_url: Option<String>,
    pub provider_chat_model: Option<String>,
    pub pricing_usd_per_1k: Option<f64>,
    pub telemetry_backend: Option<SinkBackend>,
    pub telemetry_append_timeout_ms: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        provider_base_url: cli.provider_base_url,
        provider_chat_model: cli.provider_chat_model,
        pricing_usd_per_1k: cli.pricing_usd_per_1k,
        telemetry_backend: cli.telemetry_backend,
        telemetry_append_timeout_ms: cli.telemetry_append_timeout_ms,
    };
    (config, cli.command)
}
