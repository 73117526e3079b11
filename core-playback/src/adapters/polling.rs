//! # Polling Adapter
//!
//! For backends whose native engine exposes only position/duration getters
//! and no progress callbacks. The adapter owns the progress cadence: while
//! playing, a ticker task wakes at the configured interval and the loop
//! queries the backend for a fresh snapshot.
//!
//! End of track is derived, not signalled: a tick whose position reaches a
//! known duration completes the item. Loading is confirmed: readiness is
//! reported after the backend accepts the media, before native playback is
//! started.

use crate::adapters::{Command, PlayerHandle};
use crate::controller::AudioUpdates;
use crate::error::PlaybackError;
use crate::session::{PlayerSession, SharedState};
use crate::state::{PlaybackPhase, PlaybackState};
use backend_bridge::{MediaLocation, PollingBackend};
use core_runtime::{DiagnosticsBus, PlayerConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct PollingAdapter<B: PollingBackend> {
    backend: B,
    session: PlayerSession,
    interval: Duration,
    ticker: Option<CancellationToken>,
    tick_tx: mpsc::UnboundedSender<()>,
}

impl<B: PollingBackend + 'static> PollingAdapter<B> {
    /// Spawns the event loop for `backend` and returns its control handle.
    pub fn spawn(
        backend: B,
        updates: Arc<dyn AudioUpdates>,
        config: &PlayerConfig,
        diagnostics: DiagnosticsBus,
    ) -> PlayerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let shared: SharedState = Arc::new(Mutex::new(PlaybackState::default()));
        let session = PlayerSession::new(Uuid::new_v4(), updates, diagnostics, shared.clone());

        let adapter = Self {
            backend,
            session,
            interval: config.progress_interval,
            ticker: None,
            tick_tx,
        };
        tokio::spawn(adapter.run(rx, tick_rx));

        PlayerHandle::new(tx, shared)
    }

    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Command>,
        mut tick_rx: mpsc::UnboundedReceiver<()>,
    ) {
        if let Err(e) = self.backend.initialize().await {
            let resource = String::new();
            self.session.fail(PlaybackError::from_native(e, &resource));
        }

        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd).await {
                            break;
                        }
                    }
                    None => {
                        tracing::warn!("Player handle dropped without clean_up; releasing backend");
                        self.release().await;
                        break;
                    }
                },
                Some(()) = tick_rx.recv() => self.poll_progress().await,
            }
        }
    }

    /// Returns `true` when the loop should exit.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Play(resource) => self.handle_play(resource).await,
            Command::Pause => {
                self.stop_ticker();
                if self.session.phase() == PlaybackPhase::Playing {
                    if let Err(e) = self.backend.pause_native().await {
                        let resource = self.session.current_resource().unwrap_or("").to_string();
                        self.session.fail(PlaybackError::from_native(e, &resource));
                        return false;
                    }
                }
                self.session.set_paused();
            }
            Command::Seek(position) => {
                let applied = self.session.apply_seek(position);
                if self.session.phase().is_active() {
                    if let Err(e) = self.backend.seek_native(applied).await {
                        let resource = self.session.current_resource().unwrap_or("").to_string();
                        self.session.fail(PlaybackError::from_native(e, &resource));
                    }
                }
            }
            Command::CleanUp(ack) => {
                self.release().await;
                let _ = ack.send(());
                return true;
            }
        }
        false
    }

    async fn handle_play(&mut self, resource: String) {
        // Same item while paused or ready resumes in place.
        if self.session.is_current(&resource)
            && self.session.phase() != PlaybackPhase::Playing
        {
            match self.backend.play_native().await {
                Ok(()) => {
                    self.session.set_playing();
                    self.start_ticker();
                }
                Err(e) => {
                    self.stop_ticker();
                    self.session.fail(PlaybackError::from_native(e, &resource));
                }
            }
            return;
        }
        if self.session.is_current(&resource) {
            // Already playing this item; nothing to do.
            return;
        }

        self.stop_ticker();
        self.session.begin_load(&resource);

        let location = match MediaLocation::parse(&resource) {
            Ok(location) => location,
            Err(e) => {
                self.session.fail(PlaybackError::from_native(e, &resource));
                return;
            }
        };

        if let Err(e) = self.backend.load(&location).await {
            self.session.fail(PlaybackError::from_native(e, &resource));
            return;
        }

        let duration = match self.backend.duration().await {
            Ok(duration) => duration,
            Err(e) => {
                tracing::debug!(error = %e, "Duration query failed after load; treating as unknown");
                0.0
            }
        };
        self.session.mark_ready(duration);

        match self.backend.play_native().await {
            Ok(()) => {
                self.session.set_playing();
                self.start_ticker();
            }
            Err(e) => self.session.fail(PlaybackError::from_native(e, &resource)),
        }
    }

    async fn poll_progress(&mut self) {
        // A cancelled ticker can still have one tick in flight.
        if self.session.phase() != PlaybackPhase::Playing {
            return;
        }
        let position = self.backend.position().await;
        let duration = self.backend.duration().await;
        let (position, duration) = match (position, duration) {
            (Ok(position), Ok(duration)) => (position, duration),
            (Err(e), _) | (_, Err(e)) => {
                self.stop_ticker();
                let resource = self.session.current_resource().unwrap_or("").to_string();
                self.session.fail(PlaybackError::from_native(e, &resource));
                return;
            }
        };
        self.session.record_tick(position, duration);

        let state = self.session.state();
        if state.duration > 0.0 && state.current_time >= state.duration {
            self.stop_ticker();
            self.session.finish();
        }
    }

    async fn release(&mut self) {
        self.stop_ticker();
        self.session.released();
        if let Err(e) = self.backend.release().await {
            tracing::warn!(error = %e, "Backend release reported an error");
        }
    }

    fn start_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tick_tx = self.tick_tx.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // Discard the immediate first fire so ticks land on the cadence.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if tick_tx.send(()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.ticker = Some(token);
    }

    fn stop_ticker(&mut self) {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }
}
