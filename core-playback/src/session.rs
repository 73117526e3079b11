//! # Playback Session
//!
//! State-transition engine shared by every backend adapter. A
//! [`PlayerSession`] owns the authoritative [`PlaybackState`] snapshot and
//! the lifecycle phase, applies each backend notification or control
//! request, and publishes the results: callbacks to the consumer sink,
//! diagnostics to the bus, and the latest snapshot into a shared cell the
//! adapter handle reads from.
//!
//! The session is single-owner: exactly one event-loop task mutates it, so
//! snapshot emission order is the mutation order with no interleaving.

use crate::controller::AudioUpdates;
use crate::error::PlaybackError;
use crate::state::{PlaybackPhase, PlaybackState};
use core_runtime::{DiagnosticsBus, PlayerDiagnostic};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Shared cell the adapter handle reads the latest snapshot from.
pub type SharedState = Arc<Mutex<PlaybackState>>;

pub struct PlayerSession {
    player_id: Uuid,
    state: PlaybackState,
    phase: PlaybackPhase,
    shared: SharedState,
    updates: Arc<dyn AudioUpdates>,
    diagnostics: DiagnosticsBus,
    /// Set when ready has been reported for the current load, so duplicate
    /// backend readiness signals produce a single `on_ready`.
    ready_reported: bool,
}

impl PlayerSession {
    pub fn new(
        player_id: Uuid,
        updates: Arc<dyn AudioUpdates>,
        diagnostics: DiagnosticsBus,
        shared: SharedState,
    ) -> Self {
        Self {
            player_id,
            state: PlaybackState::default(),
            phase: PlaybackPhase::Idle,
            shared,
            updates,
            diagnostics,
            ready_reported: false,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_resource(&self) -> Option<&str> {
        self.state.current_resource.as_deref()
    }

    /// Whether `resource` is the currently loaded item, making a `play`
    /// request a resume rather than a fresh load.
    pub fn is_current(&self, resource: &str) -> bool {
        self.phase.is_active() && self.current_resource() == Some(resource)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Starts loading `resource`, discarding whatever was loaded before.
    pub fn begin_load(&mut self, resource: &str) {
        tracing::info!(player_id = %self.player_id, resource, "Loading media");
        self.phase = PlaybackPhase::Loading;
        self.ready_reported = false;
        self.state = PlaybackState {
            is_playing: false,
            is_buffering: true,
            current_time: 0.0,
            duration: 0.0,
            current_resource: Some(resource.to_string()),
        };
        self.diagnostics.emit(PlayerDiagnostic::Loading {
            resource: resource.to_string(),
        });
        self.publish();
    }

    /// Marks playback as requested while the load is still in flight.
    ///
    /// Backends that start optimistically (the native engine begins as soon
    /// as it can, without a readiness handshake) flip `is_playing` here so
    /// consumers see the intent immediately.
    pub fn mark_playing_requested(&mut self) {
        if self.phase != PlaybackPhase::Loading {
            return;
        }
        self.state.is_playing = true;
        self.publish();
    }

    /// Records backend readiness. Reports `on_ready` exactly once per load.
    pub fn mark_ready(&mut self, duration: f64) {
        if self.phase == PlaybackPhase::Released || self.ready_reported {
            return;
        }
        let duration = sanitize_duration(duration);
        tracing::debug!(player_id = %self.player_id, duration, "Media ready");
        self.ready_reported = true;
        if self.phase == PlaybackPhase::Loading {
            self.phase = PlaybackPhase::Ready;
        }
        self.state.duration = duration;
        self.state.is_buffering = false;
        self.diagnostics.emit(PlayerDiagnostic::Ready {
            duration_secs: duration,
        });
        self.updates.on_ready();
        self.publish();
    }

    /// Enters the playing phase (start or resume).
    ///
    /// A playing signal that is not legal from the current phase (stale
    /// engine notifications after `Ended`, `Error`, or release) is ignored.
    pub fn set_playing(&mut self) {
        if self.phase != PlaybackPhase::Playing
            && !self.phase.can_transition_to(PlaybackPhase::Playing)
        {
            tracing::trace!(phase = ?self.phase, "Ignoring playing signal in this phase");
            return;
        }
        let resuming = self.phase == PlaybackPhase::Paused;
        self.phase = PlaybackPhase::Playing;
        self.state.is_playing = true;
        if resuming {
            self.diagnostics.emit(PlayerDiagnostic::Resumed {
                position_secs: self.state.current_time,
            });
        } else if let Some(resource) = self.current_resource() {
            self.diagnostics.emit(PlayerDiagnostic::Started {
                resource: resource.to_string(),
            });
        }
        self.publish();
    }

    /// Enters the paused phase. Publishes even when already paused, so a
    /// redundant pause still converges consumers on the same snapshot.
    pub fn set_paused(&mut self) {
        if self.phase == PlaybackPhase::Released {
            return;
        }
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Paused;
            self.diagnostics.emit(PlayerDiagnostic::Paused {
                position_secs: self.state.current_time,
            });
        }
        self.state.is_playing = false;
        self.publish();
    }

    /// Records a progress tick from the backend.
    ///
    /// Non-finite inputs are discarded; a zero or unknown duration keeps the
    /// previously known one. Position is clamped into `[0, duration]` when
    /// the duration is known.
    pub fn record_tick(&mut self, position: f64, duration: f64) {
        if self.phase == PlaybackPhase::Released {
            return;
        }
        if !position.is_finite() {
            tracing::trace!(player_id = %self.player_id, "Discarding non-finite position tick");
            return;
        }
        let duration = sanitize_duration(duration);
        if duration > 0.0 {
            self.state.duration = duration;
        }
        self.state.current_time = if self.state.duration > 0.0 {
            position.clamp(0.0, self.state.duration)
        } else {
            position.max(0.0)
        };
        self.publish();
    }

    /// Sets the buffering flag, publishing only on change.
    pub fn set_buffering(&mut self, buffering: bool) {
        if self.phase == PlaybackPhase::Released || self.state.is_buffering == buffering {
            return;
        }
        self.state.is_buffering = buffering;
        self.publish();
    }

    /// Applies a seek request, returning the clamped position actually used.
    pub fn apply_seek(&mut self, requested: f64) -> f64 {
        let applied = if self.state.duration > 0.0 {
            requested.clamp(0.0, self.state.duration)
        } else {
            requested.max(0.0)
        };
        self.state.current_time = applied;
        self.diagnostics.emit(PlayerDiagnostic::SeekApplied {
            requested_secs: requested,
            applied_secs: applied,
        });
        self.publish();
        applied
    }

    /// Records natural end of the track: position resets, the item unloads,
    /// but the last known duration is kept for end-of-track UI.
    pub fn finish(&mut self) {
        if self.phase == PlaybackPhase::Released {
            return;
        }
        let resource = self.state.current_resource.take();
        if let Some(resource) = &resource {
            tracing::info!(player_id = %self.player_id, resource, "Track completed");
            self.diagnostics.emit(PlayerDiagnostic::Completed {
                resource: resource.clone(),
            });
        }
        self.phase = PlaybackPhase::Ended;
        self.state.is_playing = false;
        self.state.is_buffering = false;
        self.state.current_time = 0.0;
        self.publish();
    }

    /// Reports a failure: the error callback fires first, then a stopped
    /// snapshot with the item unloaded.
    pub fn fail(&mut self, error: PlaybackError) {
        if self.phase == PlaybackPhase::Released {
            return;
        }
        tracing::error!(player_id = %self.player_id, %error, "Playback fault");
        self.diagnostics.emit(PlayerDiagnostic::Faulted {
            kind: error.fault_kind(),
            message: error.to_string(),
        });
        self.phase = PlaybackPhase::Error;
        self.updates.on_error(error);
        self.state.is_playing = false;
        self.state.is_buffering = false;
        self.state.current_resource = None;
        self.publish();
    }

    /// Marks the session released. No snapshot is published; consumers see
    /// nothing further from this player.
    pub fn released(&mut self) {
        tracing::info!(player_id = %self.player_id, "Player released");
        self.phase = PlaybackPhase::Released;
        self.diagnostics.emit(PlayerDiagnostic::Released);
    }

    fn publish(&self) {
        *self.shared.lock() = self.state.clone();
        self.updates.on_progress(self.state.clone());
    }
}

/// Backends report durations as NaN, infinity, or 0 before metadata is
/// known; normalize all of those to "unknown" (0).
fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}
