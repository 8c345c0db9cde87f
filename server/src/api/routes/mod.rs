//! API route handlers

pub mod clinical;
pub mod health;
pub mod logs;
pub mod metrics;
