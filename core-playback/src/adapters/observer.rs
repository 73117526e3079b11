//! # Observer Adapter
//!
//! For backends whose native engine offers a registerable periodic time
//! observer plus an end-of-item notification. The adapter registers one
//! observer per load at the configured interval and multiplexes its events
//! into the session.
//!
//! Duration is often unknown until the engine has inspected the media, so
//! readiness is reported from the first tick that carries a usable
//! duration. Ticks without one are suppressed entirely; they carry no
//! progress a consumer could render.
//!
//! Observer registrations are scoped to a load: superseding a load or
//! releasing the player cancels the native observer before anything else,
//! so a registration can never outlive the item it watches.

use crate::adapters::{Command, PlayerHandle};
use crate::controller::AudioUpdates;
use crate::error::PlaybackError;
use crate::session::{PlayerSession, SharedState};
use crate::state::{PlaybackPhase, PlaybackState};
use backend_bridge::{MediaLocation, ObserverBackend, ObserverEvent, ObserverTick};
use core_runtime::{DiagnosticsBus, PlayerConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct ObserverAdapter<B: ObserverBackend> {
    backend: B,
    session: PlayerSession,
    interval: Duration,
    observer_rx: Option<mpsc::UnboundedReceiver<ObserverEvent>>,
}

impl<B: ObserverBackend + 'static> ObserverAdapter<B> {
    /// Spawns the event loop for `backend` and returns its control handle.
    pub fn spawn(
        backend: B,
        updates: Arc<dyn AudioUpdates>,
        config: &PlayerConfig,
        diagnostics: DiagnosticsBus,
    ) -> PlayerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared: SharedState = Arc::new(Mutex::new(PlaybackState::default()));
        let session = PlayerSession::new(Uuid::new_v4(), updates, diagnostics, shared.clone());

        let adapter = Self {
            backend,
            session,
            interval: config.progress_interval,
            observer_rx: None,
        };
        tokio::spawn(adapter.run(rx));

        PlayerHandle::new(tx, shared)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        if let Err(e) = self.backend.initialize().await {
            self.session.fail(PlaybackError::from_native(e, ""));
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
                event = next_event(&mut self.observer_rx) => self.handle_event(event).await,
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Play(resource) => self.handle_play(resource).await,
            Command::Pause => {
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
        if self.session.is_current(&resource) {
            if self.session.phase() == PlaybackPhase::Playing {
                return;
            }
            match self.backend.play_native().await {
                Ok(()) => self.session.set_playing(),
                Err(e) => self.session.fail(PlaybackError::from_native(e, &resource)),
            }
            return;
        }

        self.drop_observer().await;
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

        match self.backend.observe(self.interval).await {
            Ok(receiver) => self.observer_rx = Some(receiver),
            Err(e) => {
                self.session.fail(PlaybackError::from_native(e, &resource));
                return;
            }
        }

        match self.backend.play_native().await {
            Ok(()) => self.session.set_playing(),
            Err(e) => {
                self.drop_observer().await;
                self.session.fail(PlaybackError::from_native(e, &resource));
            }
        }
    }

    async fn handle_event(&mut self, event: ObserverEvent) {
        match event {
            ObserverEvent::Time(ObserverTick { position, duration }) => {
                if self.session.phase() != PlaybackPhase::Playing {
                    return;
                }
                // Engines report NaN or zero duration until the item's
                // timing resolves; such ticks carry no usable progress and
                // are dropped whole.
                if !duration.is_finite() || duration <= 0.0 {
                    return;
                }
                self.session.mark_ready(duration);
                self.session.record_tick(position, duration);
            }
            ObserverEvent::Ended => {
                self.drop_observer().await;
                self.session.finish();
            }
        }
    }

    async fn drop_observer(&mut self) {
        if self.observer_rx.take().is_some() {
            if let Err(e) = self.backend.cancel_observer().await {
                tracing::warn!(error = %e, "Observer cancellation reported an error");
            }
        }
    }

    async fn release(&mut self) {
        self.drop_observer().await;
        self.session.released();
        if let Err(e) = self.backend.release().await {
            tracing::warn!(error = %e, "Backend release reported an error");
        }
    }
}

/// Resolves to the next observer event, pending forever while no observer
/// is registered or after its sender closed.
async fn next_event(rx: &mut Option<mpsc::UnboundedReceiver<ObserverEvent>>) -> ObserverEvent {
    match rx {
        Some(receiver) => match receiver.recv().await {
            Some(event) => event,
            None => {
                *rx = None;
                std::future::pending().await
            }
        },
        None => std::future::pending().await,
    }
}
