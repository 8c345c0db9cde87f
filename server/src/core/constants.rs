// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "MedAssist";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "medassist";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".medassist";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "medassist.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "MEDASSIST_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "MEDASSIST_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "MEDASSIST_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "MEDASSIST_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Body limit for the pipeline endpoints (JSON only, audio is fetched by URL)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "MEDASSIST_DATA_DIR";

// =============================================================================
// Provider
// =============================================================================

/// Environment variable for the provider API key
pub const ENV_OPENAI_API_KEY: &str = "MEDASSIST_OPENAI_API_KEY";

/// Fallback environment variable for the provider API key
pub const ENV_OPENAI_API_KEY_FALLBACK: &str = "OPENAI_API_KEY";

/// Environment variable for the provider base URL
pub const ENV_PROVIDER_BASE_URL: &str = "MEDASSIST_PROVIDER_BASE_URL";

/// Environment variable for the chat model
pub const ENV_PROVIDER_CHAT_MODEL: &str = "MEDASSIST_PROVIDER_CHAT_MODEL";

/// Default OpenAI-compatible API base URL
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat completion model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Default transcription model
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default provider request timeout
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Pricing
// =============================================================================

/// Environment variable for the price per thousand tokens
pub const ENV_PRICING_USD_PER_1K: &str = "MEDASSIST_PRICING_USD_PER_1K";

/// Default price per thousand tokens (gpt-3.5-turbo list price)
pub const DEFAULT_USD_PER_1K_TOKENS: f64 = 0.0020;

/// Characters per token used when a provider reports no usage
pub const CHARS_PER_TOKEN_ESTIMATE: usize = 4;

// =============================================================================
// Telemetry
// =============================================================================

/// Environment variable for the telemetry sink backend
pub const ENV_TELEMETRY_BACKEND: &str = "MEDASSIST_TELEMETRY_BACKEND";

/// Environment variable for the sink append timeout
pub const ENV_TELEMETRY_APPEND_TIMEOUT_MS: &str = "MEDASSIST_TELEMETRY_APPEND_TIMEOUT_MS";

/// Default upper bound for a single sink append
pub const DEFAULT_TELEMETRY_APPEND_TIMEOUT_MS: u64 = 2000;

/// Latency histogram name
pub const METRIC_LATENCY: &str = "function_latency_ms";

/// Token counter name
pub const METRIC_TOKENS: &str = "openai_tokens_total";

/// Cost counter name
pub const METRIC_COST: &str = "openai_cost_usd";

/// Latency histogram buckets in milliseconds
pub const LATENCY_BUCKETS_MS: &[f64] = &[
    10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0,
];

// =============================================================================
// SQLite
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "medassist.db";

/// Maximum SQLite pool connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-16000";

/// Pages between automatic WAL checkpoints
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

// =============================================================================
// Telemetry query API
// =============================================================================

/// Maximum records returned by the logs endpoint
pub const MAX_LOGS_LIMIT: u32 = 500;

/// Default records returned by the logs endpoint
pub const DEFAULT_LOGS_LIMIT: u32 = 50;
