//! # Media-Event Adapter
//!
//! For media-element backends that push their own lifecycle events
//! (canplay, timeupdate, ended, error) and need no polling from our side.
//!
//! Starts are optimistic: native playback is requested as soon as the
//! element has a source, and the snapshot reports the intent to play while
//! the load is still in flight. Readiness is confirmed by the element's
//! canplay event; an error event while still loading is a load failure,
//! after that a playback failure.
//!
//! Event subscriptions are per load. Taking a fresh stream detaches the
//! previous one, so events from a superseded item never reach the session.

use crate::adapters::{Command, PlayerHandle};
use crate::controller::AudioUpdates;
use crate::error::PlaybackError;
use crate::session::{PlayerSession, SharedState};
use crate::state::{PlaybackPhase, PlaybackState};
use backend_bridge::{EventBackend, MediaElementEvent, MediaLocation};
use core_runtime::DiagnosticsBus;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct MediaEventAdapter<B: EventBackend> {
    backend: B,
    session: PlayerSession,
    events_rx: Option<mpsc::UnboundedReceiver<MediaElementEvent>>,
}

impl<B: EventBackend + 'static> MediaEventAdapter<B> {
    /// Spawns the event loop for `backend` and returns its control handle.
    pub fn spawn(
        backend: B,
        updates: Arc<dyn AudioUpdates>,
        diagnostics: DiagnosticsBus,
    ) -> PlayerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared: SharedState = Arc::new(Mutex::new(PlaybackState::default()));
        let session = PlayerSession::new(Uuid::new_v4(), updates, diagnostics, shared.clone());

        let adapter = Self {
            backend,
            session,
            events_rx: None,
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
                event = next_event(&mut self.events_rx) => self.handle_event(event).await,
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Play(resource) => self.handle_play(resource).await,
            Command::Pause => {
                // An optimistic start can be paused before canplay arrives,
                // so gate on the reported intent rather than the phase.
                if self.session.state().is_playing {
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

        self.events_rx = None;
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

        match self.backend.events().await {
            Ok(receiver) => self.events_rx = Some(receiver),
            Err(e) => {
                self.session.fail(PlaybackError::from_native(e, &resource));
                return;
            }
        }

        // Optimistic start: request native playback immediately and surface
        // the intent; canplay confirms it.
        match self.backend.play_native().await {
            Ok(()) => self.session.mark_playing_requested(),
            Err(e) => {
                self.events_rx = None;
                self.session.fail(PlaybackError::from_native(e, &resource));
            }
        }
    }

    async fn handle_event(&mut self, event: MediaElementEvent) {
        match event {
            MediaElementEvent::CanPlay { duration } => {
                self.session.mark_ready(duration);
                if self.session.state().is_playing {
                    self.session.set_playing();
                }
            }
            MediaElementEvent::TimeUpdate { position, duration } => {
                if self.session.phase().is_active() {
                    self.session.record_tick(position, duration);
                }
            }
            MediaElementEvent::Ended => {
                self.events_rx = None;
                self.session.finish();
            }
            MediaElementEvent::Error { message } => {
                self.events_rx = None;
                let error = if self.session.phase() == PlaybackPhase::Loading {
                    PlaybackError::LoadFailure {
                        resource: self.session.current_resource().unwrap_or("").to_string(),
                        message,
                    }
                } else {
                    PlaybackError::PlaybackFailure { message }
                };
                self.session.fail(error);
            }
        }
    }

    async fn release(&mut self) {
        self.events_rx = None;
        self.session.released();
        if let Err(e) = self.backend.release().await {
            tracing::warn!(error = %e, "Backend release reported an error");
        }
    }
}

/// Resolves to the next media event, pending forever while no stream is
/// attached or after its sender closed.
async fn next_event(rx: &mut Option<mpsc::UnboundedReceiver<MediaElementEvent>>) -> MediaElementEvent {
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
