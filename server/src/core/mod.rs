//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod shutdown;
pub mod storage;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AppConfig, ServerConfig};
pub use context::AppContext;
pub use shutdown::ShutdownService;
pub use storage::{AppStorage, DataSubdir};
