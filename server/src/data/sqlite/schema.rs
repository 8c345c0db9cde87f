//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- Telemetry: one row per handled request, append-only
-- =============================================================================
CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    endpoint TEXT NOT NULL,
    ms INTEGER NOT NULL CHECK (ms >= 0),
    tokens INTEGER NOT NULL CHECK (tokens >= 0),
    cost_usd REAL NOT NULL CHECK (cost_usd >= 0),
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_logs_endpoint_timestamp ON logs(endpoint, timestamp DESC);
"#;
