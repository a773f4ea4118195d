//! CLI command handlers.

pub mod capture;
pub mod config;
pub mod records;
