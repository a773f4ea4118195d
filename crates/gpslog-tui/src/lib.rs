//! Full-screen TUI for gpslog.
//!
//! Elm-style architecture: the runtime collects [`events::UiEvent`]s
//! (terminal input, ticks, async results), the pure [`update`] reducer
//! mutates state and returns [`effects::UiEffect`]s, and the runtime
//! executes those effects by spawning async handlers whose results come
//! back through the inbox channel.

pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use anyhow::Result;
use gpslog_core::config::Config;
use gpslog_core::services::Services;
pub use runtime::TuiRuntime;

/// Runs the interactive logger UI.
pub async fn run(config: &Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The interactive UI requires a terminal.\n\
             Use `gpslog capture` for non-interactive capture."
        );
    }

    let services = Arc::new(Services::from_config(config)?);
    let mut runtime = TuiRuntime::new(services)?;
    runtime.run()
}
