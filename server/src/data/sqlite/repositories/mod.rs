//! SQLite repositories
//!
//! Types should be imported from `crate::data::types`.

pub mod metric_log;

pub use metric_log::{insert_metric_log, list_metric_logs};
