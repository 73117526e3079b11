//! Native backend capability traits and their wire types.
//!
//! Every backend implements [`NativeControls`]; each additionally implements
//! exactly one of the progress-synchronization capabilities below, matching
//! how its native engine exposes playback progress:
//!
//! - [`PollingBackend`] for engines that only offer pull-style accessors
//! - [`ObserverBackend`] for engines with registerable periodic observers
//! - [`EventBackend`] for engines that push discrete media events
//! - [`ListenerBackend`] for engines with push-based state listeners
//!
//! Subscriptions returned by [`ObserverBackend::observe`] and
//! [`EventBackend::events`] are per load: the backend must drop the previous
//! sender when a new subscription is taken, so that no event from a
//! superseded media item can be delivered once a new one is loading.
//!
//! All positions and durations at this boundary are in seconds. Backends
//! whose engines report milliseconds convert internally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{error::Result, media::MediaLocation, platform::PlatformSendSync};

/// Base control surface every native media backend provides.
///
/// The playback core calls these from a single event loop per backend
/// instance; implementations never see concurrent calls.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait NativeControls: PlatformSendSync {
    /// One-time backend setup (audio session activation, output route
    /// configuration). Invoked once before any other call; a failure is
    /// reported to consumers but does not poison the backend.
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Load a media item, replacing any previously loaded one.
    async fn load(&mut self, location: &MediaLocation) -> Result<()>;

    /// Start or resume playback of the loaded item.
    async fn play_native(&mut self) -> Result<()>;

    /// Pause playback, keeping position and the loaded item.
    async fn pause_native(&mut self) -> Result<()>;

    /// Move the playback head to an absolute position in seconds.
    async fn seek_native(&mut self, seconds: f64) -> Result<()>;

    /// Stop playback and release every native resource, including any
    /// observers or listeners the backend registered. Must be safe to call
    /// more than once.
    async fn release(&mut self) -> Result<()>;
}

/// Capability for engines that expose progress only through pull-style
/// accessors. The core samples both on a fixed interval while playing.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PollingBackend: NativeControls {
    /// Current playback position in seconds.
    async fn position(&mut self) -> Result<f64>;

    /// Total duration of the loaded item in seconds; `0.0` while unknown.
    async fn duration(&mut self) -> Result<f64>;
}

/// One periodic time-observer callback's payload.
///
/// Values are forwarded exactly as the engine reported them and may be NaN
/// or carry a zero duration while the item's timing is not yet resolved; the
/// core suppresses such ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverTick {
    /// Position in seconds.
    pub position: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// Event delivered through an observer subscription.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ObserverEvent {
    /// Periodic time observer fired.
    Time(ObserverTick),
    /// The loaded item played to its end.
    Ended,
}

/// Capability for engines that support registering a callback at a fixed
/// time interval (plus an end-of-item notification).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ObserverBackend: NativeControls {
    /// Register the periodic time observer and the end-of-item notification
    /// for the currently loaded item, multiplexed into one stream. Replaces
    /// any previous registration.
    async fn observe(&mut self, interval: Duration) -> Result<UnboundedReceiver<ObserverEvent>>;

    /// Remove the observer and notification registrations. Called on stop
    /// and before release; a registration left behind is a resource leak.
    async fn cancel_observer(&mut self) -> Result<()>;
}

/// Discrete event pushed by a media-element style engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum MediaElementEvent {
    /// The element can produce frames; duration and metadata are known.
    /// Delivered at most once per loaded item.
    CanPlay {
        /// Duration in seconds.
        duration: f64,
    },
    /// Playback time advanced.
    TimeUpdate {
        /// Position in seconds.
        position: f64,
        /// Duration in seconds.
        duration: f64,
    },
    /// The item played to its end.
    Ended,
    /// The element failed to load or play the item.
    Error {
        /// Engine-reported failure description.
        message: String,
    },
}

/// Capability for engines that push discrete media events.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait EventBackend: NativeControls {
    /// Subscribe to the event stream for the currently loaded item.
    /// Replaces any previous subscription.
    async fn events(&mut self) -> Result<UnboundedReceiver<MediaElementEvent>>;
}

/// Notification pushed by a native player listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum PlayerNotification {
    /// The player can begin producing frames; duration is known.
    Ready {
        /// Duration in seconds.
        duration: f64,
    },
    /// The engine's play/pause state changed.
    PlayingChanged {
        /// `true` when the engine is now playing.
        playing: bool,
    },
    /// The engine started or stopped buffering.
    Buffering {
        /// `true` while the engine is buffering.
        buffering: bool,
    },
    /// Playback time advanced.
    TimeChanged {
        /// Position in seconds.
        position: f64,
        /// Duration in seconds.
        duration: f64,
    },
    /// The item played to its end.
    Finished,
    /// The engine reported a failure.
    Error {
        /// Engine-reported failure description.
        message: String,
    },
}

/// Capability for engines whose native API already provides push-based
/// state and position change notifications through a registered listener.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ListenerBackend: NativeControls {
    /// Attach the listener and return its notification stream. Registered
    /// once per backend instance; the listener must be detached by
    /// [`NativeControls::release`].
    async fn notifications(&mut self) -> Result<UnboundedReceiver<PlayerNotification>>;
}
