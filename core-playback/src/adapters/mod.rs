//! # Backend Adapters
//!
//! One adapter per backend integration strategy:
//!
//! - [`polling`] for backends exposing only position/duration getters; the
//!   adapter drives a progress ticker itself.
//! - [`observer`] for backends with a registerable periodic time observer
//!   and an end-of-item notification.
//! - [`events`] for media-element backends that push lifecycle events
//!   (canplay/timeupdate/ended/error).
//! - [`listener`] for engine backends with a rich listener callback surface
//!   (ready/state-change/time/finished/error).
//!
//! Every adapter follows the same shape: construction spawns a single
//! event-loop task that owns the native backend and a
//! [`PlayerSession`](crate::session::PlayerSession), and hands back a
//! [`PlayerHandle`]. Control calls become messages to the loop; all
//! snapshots, callbacks, and diagnostics are emitted from inside the loop,
//! so consumers observe one serialized stream of updates regardless of how
//! the native engine delivers its notifications.

pub mod events;
pub mod listener;
pub mod observer;
pub mod polling;

use crate::controller::AudioPlayer;
use crate::session::SharedState;
use crate::state::PlaybackState;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Control request forwarded to an adapter's event loop.
#[derive(Debug)]
pub(crate) enum Command {
    Play(String),
    Pause,
    Seek(f64),
    CleanUp(oneshot::Sender<()>),
}

/// Handle to a spawned adapter event loop.
///
/// Cheap to clone behind an `Arc`; all four adapters return this same
/// handle type, differing only in the loop behind the channel.
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<Command>,
    shared: SharedState,
}

impl PlayerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>, shared: SharedState) -> Self {
        Self { tx, shared }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AudioPlayer for PlayerHandle {
    async fn play(&self, resource: &str) {
        // Send failure means the loop has exited (player released); control
        // calls after release are defined as no-ops.
        let _ = self.tx.send(Command::Play(resource.to_string()));
    }

    async fn pause(&self) {
        let _ = self.tx.send(Command::Pause);
    }

    async fn seek(&self, position: f64) {
        let _ = self.tx.send(Command::Seek(position));
    }

    async fn clean_up(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::CleanUp(ack_tx)).is_ok() {
            // The loop drops the sender without sending only if it already
            // released through another path; either way teardown is done.
            let _ = ack_rx.await;
        }
    }

    fn current_state(&self) -> PlaybackState {
        self.shared.lock().clone()
    }
}
