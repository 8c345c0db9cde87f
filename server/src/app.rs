//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{
    APP_NAME, APP_NAME_LOWER, ENV_LOG, ENV_OPENAI_API_KEY, ENV_OPENAI_API_KEY_FALLBACK,
};
use crate::core::context::AppContext;
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::TelemetryService;
use crate::domain::MetricsRegistry;
use crate::domain::clinical::ClinicalService;
use crate::domain::provider::{HttpAudioSource, OpenAiProvider};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub telemetry: Arc<TelemetryService>,
    pub context: Arc<AppContext>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;

        let api_key = Self::api_key()?;
        let client = reqwest::Client::builder()
            .timeout(config.provider.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let provider = Arc::new(OpenAiProvider::new(
            client.clone(),
            &config.provider,
            api_key,
        ));
        let audio = Arc::new(HttpAudioSource::new(client));

        let telemetry = Arc::new(
            TelemetryService::init(config.telemetry.backend, &storage)
                .await
                .context("Failed to initialize telemetry store")?,
        );
        tracing::debug!(backend = %telemetry.backend(), "Telemetry initialized");

        let metrics = Arc::new(
            MetricsRegistry::new().context("Failed to initialize metrics registry")?,
        );

        let context = Arc::new(AppContext::new(
            ClinicalService::new(provider, audio, config.pricing),
            telemetry.sink(),
            metrics,
            config.telemetry,
        ));

        let shutdown = ShutdownService::new(Some(telemetry.clone()));

        Ok(Self {
            shutdown,
            config,
            storage,
            telemetry,
            context,
        })
    }

    fn api_key() -> Result<String> {
        std::env::var(ENV_OPENAI_API_KEY)
            .or_else(|_| std::env::var(ENV_OPENAI_API_KEY_FALLBACK))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| {
                format!(
                    "Missing provider API key: set {} or {}",
                    ENV_OPENAI_API_KEY, ENV_OPENAI_API_KEY_FALLBACK
                )
            })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            data_dir = %app.storage.data_dir().display(),
            "{} starting",
            APP_NAME
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
