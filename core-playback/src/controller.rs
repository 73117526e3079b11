//! # Playback Control Contract
//!
//! The backend-independent control surface ([`AudioPlayer`]) and the
//! consumer callback sink ([`AudioUpdates`]) every adapter drives.
//!
//! Control calls are accept-and-forward: they return `()` and never fail at
//! the call site. Failures surface asynchronously through
//! [`AudioUpdates::on_error`], which keeps the contract identical across
//! backends whose native engines fail at very different points.

use crate::error::PlaybackError;
use crate::state::PlaybackState;
use async_trait::async_trait;
use backend_bridge::PlatformSendSync;

/// Uniform playback control surface over any backend adapter.
///
/// All methods are fire-and-forget from the caller's perspective: the
/// adapter applies (or queues) the request and reports outcomes through the
/// [`AudioUpdates`] sink it was constructed with.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AudioPlayer: PlatformSendSync {
    /// Load `resource` and begin playback, or resume the current item.
    ///
    /// Passing the identifier of the already-loaded resource resumes in
    /// place without reloading. Any other identifier stops the current item
    /// and starts a fresh load; updates for the superseded item cease.
    async fn play(&self, resource: &str);

    /// Pause playback, retaining position and loaded media.
    ///
    /// A no-op when nothing is playing, though a snapshot is still
    /// published so consumers converge on the paused state.
    async fn pause(&self);

    /// Move the playhead to `position` seconds.
    ///
    /// The position is clamped to `[0, duration]`; while the duration is
    /// unknown the request is clamped at zero only.
    async fn seek(&self, position: f64);

    /// Release native resources and stop all update delivery.
    ///
    /// Resolves only after the backend has been torn down. Idempotent:
    /// later calls (and any other control call) are silently ignored.
    async fn clean_up(&self);

    /// Last published snapshot.
    fn current_state(&self) -> PlaybackState;
}

/// Consumer-side sink for playback updates.
///
/// Implemented by whoever hosts the player (UI layer, test harness).
/// Callbacks are invoked from the adapter's event loop, one at a time and
/// in emission order.
#[cfg_attr(test, mockall::automock)]
pub trait AudioUpdates: PlatformSendSync {
    /// A new snapshot was published.
    fn on_progress(&self, state: PlaybackState);

    /// Media finished loading; the accompanying snapshot carries the
    /// resolved duration.
    fn on_ready(&self);

    /// A failure occurred; playback of the current item has stopped.
    fn on_error(&self, error: PlaybackError);
}
