//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! The runtime uses an "inbox" for async event collection:
//! - Handlers send `UiEvent`s to `inbox_tx`
//! - The runtime drains `inbox_rx` each frame to collect results
//!
//! The live store subscription is the one long-lived task. Its forwarder
//! pumps `StoreEvent`s into the inbox, and the runtime keeps only the
//! cancellation token so sign-out and exit can tear it down.

mod handlers;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use gpslog_core::services::Services;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence. Drives notice expiry and caps the render rate.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is guaranteed to be restored on drop or panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    services: Arc<Services>,
    /// Inbox sender - handlers send events here.
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    /// Inbox receiver - the runtime drains this each frame.
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    /// Cancellation token of the active store subscription, if any.
    subscription_cancel: Option<CancellationToken>,
    /// Last time a Tick event was emitted.
    last_tick: Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime and takes over the terminal.
    pub fn new(services: Arc<Services>) -> Result<Self> {
        // Set up the panic hook BEFORE entering the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state: AppState::new(),
            services,
            inbox_tx,
            inbox_rx,
            subscription_cancel: None,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let events = self.collect_events()?;

            for event in events {
                // Only Tick marks the frame dirty unconditionally; everything
                // else renders on the next tick.
                if matches!(&event, UiEvent::Tick | UiEvent::Terminal(_) | UiEvent::Store(_)) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        self.stop_subscription();
        Ok(())
    }

    /// Collects events from the inbox and the terminal, emitting Tick on cadence.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Drain the inbox - all async results arrive here.
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Poll terminal events:
        // - If we already have events to process, do a non-blocking poll
        // - Otherwise, block until the next tick is due
        let time_until_tick = TICK_INTERVAL.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking).
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= TICK_INTERVAL {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a pure async handler and sends its result to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// Executes a single effect by dispatching to the appropriate handler.
    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::SignIn { email, password } => {
                let services = Arc::clone(&self.services);
                self.spawn_effect(move || handlers::sign_in(services, email, password));
            }
            UiEffect::SignOut { session } => {
                self.stop_subscription();
                self.services.identity.sign_out(session);
            }
            UiEffect::FetchLocation => {
                let services = Arc::clone(&self.services);
                self.spawn_effect(move || handlers::fetch_location(services));
            }
            UiEffect::AppendRecord { record } => {
                let Some(session) = self.state.session.clone() else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_effect(move || handlers::append_record(services, session, record));
            }
            UiEffect::StartSubscription => self.start_subscription(),
        }
    }

    /// Starts the live store subscription for the current session.
    ///
    /// The forwarder task pumps store deliveries into the inbox until the
    /// subscription channel closes. Any previous subscription is cancelled
    /// first, so at most one is alive at a time.
    fn start_subscription(&mut self) {
        let Some(session) = self.state.session.clone() else {
            return;
        };
        self.stop_subscription();

        let mut subscription = self.services.store.subscribe(&session);
        self.subscription_cancel = Some(subscription.cancel_token());

        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                if tx.send(UiEvent::Store(event)).is_err() {
                    return;
                }
            }
            let _ = tx.send(UiEvent::SubscriptionEnded);
        });
    }

    fn stop_subscription(&mut self) {
        if let Some(cancel) = self.subscription_cancel.take() {
            cancel.cancel();
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.stop_subscription();
        let _ = terminal::restore_terminal();
    }
}
