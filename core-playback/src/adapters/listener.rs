//! # Listener Adapter
//!
//! For engine backends with a rich listener callback surface: readiness,
//! play-state changes, buffering, time changes, finish, and errors arrive
//! as one persistent notification stream attached when the engine is
//! created.
//!
//! Starts are optimistic, confirmed by the engine's play-state
//! notifications. Because the stream outlives individual loads, the queue
//! is drained after each successful load so notifications from the
//! superseded item are never applied to the new one.

use crate::adapters::{Command, PlayerHandle};
use crate::controller::AudioUpdates;
use crate::error::PlaybackError;
use crate::session::{PlayerSession, SharedState};
use crate::state::{PlaybackPhase, PlaybackState};
use backend_bridge::{ListenerBackend, MediaLocation, PlayerNotification};
use core_runtime::DiagnosticsBus;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use uuid::Uuid;

pub struct ListenerAdapter<B: ListenerBackend> {
    backend: B,
    session: PlayerSession,
    notifications: Option<mpsc::UnboundedReceiver<PlayerNotification>>,
}

impl<B: ListenerBackend + 'static> ListenerAdapter<B> {
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
            notifications: None,
        };
        tokio::spawn(adapter.run(rx));

        PlayerHandle::new(tx, shared)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        if let Err(e) = self.backend.initialize().await {
            self.session.fail(PlaybackError::from_native(e, ""));
        }
        match self.backend.notifications().await {
            Ok(receiver) => self.notifications = Some(receiver),
            Err(e) => self.session.fail(PlaybackError::from_native(e, "")),
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
                notification = next_notification(&mut self.notifications) => {
                    self.handle_notification(notification).await
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Play(resource) => self.handle_play(resource).await,
            Command::Pause => {
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

        // Notifications queued before this point belong to the previous
        // item; the stream itself persists across loads.
        self.drain_notifications();

        match self.backend.play_native().await {
            Ok(()) => self.session.mark_playing_requested(),
            Err(e) => self.session.fail(PlaybackError::from_native(e, &resource)),
        }
    }

    async fn handle_notification(&mut self, notification: PlayerNotification) {
        match notification {
            PlayerNotification::Ready { duration } => {
                self.session.mark_ready(duration);
                if self.session.state().is_playing {
                    self.session.set_playing();
                }
            }
            PlayerNotification::PlayingChanged { playing } => {
                if playing {
                    self.session.set_playing();
                } else if self.session.phase() == PlaybackPhase::Playing {
                    self.session.set_paused();
                }
            }
            PlayerNotification::Buffering { buffering } => {
                self.session.set_buffering(buffering);
            }
            PlayerNotification::TimeChanged { position, duration } => {
                if self.session.phase().is_active() {
                    self.session.record_tick(position, duration);
                }
            }
            PlayerNotification::Finished => self.session.finish(),
            PlayerNotification::Error { message } => {
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

    fn drain_notifications(&mut self) {
        let Some(rx) = self.notifications.as_mut() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(stale) => {
                    tracing::trace!(?stale, "Discarding notification from superseded item")
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    async fn release(&mut self) {
        self.notifications = None;
        self.session.released();
        if let Err(e) = self.backend.release().await {
            tracing::warn!(error = %e, "Backend release reported an error");
        }
    }
}

/// Resolves to the next engine notification, pending forever once the
/// stream is detached or closed.
async fn next_notification(
    rx: &mut Option<mpsc::UnboundedReceiver<PlayerNotification>>,
) -> PlayerNotification {
    match rx {
        Some(receiver) => match receiver.recv().await {
            Some(notification) => notification,
            None => {
                *rx = None;
                std::future::pending().await
            }
        },
        None => std::future::pending().await,
    }
}
