//! Core services for gpslog: configuration and the remote-service clients
//! (identity, location, coordinate store).
//!
//! This crate has no UI dependencies. The TUI and CLI construct a
//! [`services::Services`] container from a [`config::Config`] and drive the
//! capture-and-sync flow through it.

pub mod config;
pub mod services;
