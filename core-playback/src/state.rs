//! # Playback State Model
//!
//! The immutable snapshot type published to consumers and the internal
//! lifecycle phase machine the adapters step through.
//!
//! Snapshots are plain values: every change produces a new [`PlaybackState`]
//! rather than mutating a shared one, so consumers can hold onto a snapshot
//! without observing later updates through it.

use serde::{Deserialize, Serialize};

// ============================================================================
// Playback Snapshot
// ============================================================================

/// A point-in-time view of the player, published on every observable change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Whether audio is actively advancing (or requested to, during load).
    pub is_playing: bool,
    /// Whether the backend is stalled waiting for data.
    pub is_buffering: bool,
    /// Current position in seconds.
    pub current_time: f64,
    /// Total duration in seconds, 0 when not yet known.
    pub duration: f64,
    /// Identifier of the loaded resource, if any.
    pub current_resource: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_buffering: false,
            current_time: 0.0,
            duration: 0.0,
            current_resource: None,
        }
    }
}

impl PlaybackState {
    /// Fraction of the track played, in `0.0..=1.0`.
    ///
    /// Returns `None` while the duration is unknown or zero, so consumers
    /// never see `NaN` or infinite ratios.
    pub fn progress(&self) -> Option<f64> {
        if self.duration > 0.0 && self.duration.is_finite() {
            Some((self.current_time / self.duration).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// Like [`progress`](Self::progress) but defaulting to `0.0`, for UI
    /// bindings that want a plain number.
    pub fn progress_or_zero(&self) -> f64 {
        self.progress().unwrap_or(0.0)
    }
}

// ============================================================================
// Lifecycle Phases
// ============================================================================

/// Internal lifecycle phase of a playback session.
///
/// Adapters use the phase to decide which backend notifications are still
/// relevant; it is not part of the consumer-facing snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No media loaded.
    Idle,
    /// A resource is being opened.
    Loading,
    /// Media opened, frames available, not yet started.
    Ready,
    /// Audio advancing.
    Playing,
    /// Paused at a position.
    Paused,
    /// Track played to its natural end.
    Ended,
    /// A failure was reported; a new load is required to recover.
    Error,
    /// Native resources released; terminal.
    Released,
}

impl PlaybackPhase {
    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: PlaybackPhase) -> bool {
        use PlaybackPhase::*;
        // Released is terminal; any phase may enter Error, Loading (a new
        // load supersedes whatever was happening) or Released.
        if *self == Released {
            return false;
        }
        if matches!(next, Error | Loading | Released) {
            return true;
        }
        matches!(
            (self, next),
            (Loading, Ready)
                | (Loading, Playing)
                | (Ready, Playing)
                | (Playing, Paused)
                | (Playing, Ended)
                | (Paused, Playing)
                | (Error, Idle)
        )
    }

    /// Whether media can still produce audio in this phase.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackPhase::Ready | PlaybackPhase::Playing | PlaybackPhase::Paused
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let state = PlaybackState::default();
        assert!(!state.is_playing);
        assert!(!state.is_buffering);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);
        assert!(state.current_resource.is_none());
    }

    #[test]
    fn test_progress_with_known_duration() {
        let state = PlaybackState {
            current_time: 45.0,
            duration: 180.0,
            ..Default::default()
        };
        assert_eq!(state.progress(), Some(0.25));
        assert_eq!(state.progress_or_zero(), 0.25);
    }

    #[test]
    fn test_progress_unknown_duration() {
        let state = PlaybackState {
            current_time: 45.0,
            duration: 0.0,
            ..Default::default()
        };
        assert_eq!(state.progress(), None);
        assert_eq!(state.progress_or_zero(), 0.0);
    }

    #[test]
    fn test_progress_clamped() {
        let state = PlaybackState {
            current_time: 200.0,
            duration: 180.0,
            ..Default::default()
        };
        assert_eq!(state.progress(), Some(1.0));
    }

    #[test]
    fn test_phase_transitions() {
        use PlaybackPhase::*;
        assert!(Idle.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Ready));
        assert!(Loading.can_transition_to(Playing));
        assert!(Ready.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Ended));
        assert!(Ended.can_transition_to(Loading));
        assert!(Playing.can_transition_to(Error));

        assert!(!Idle.can_transition_to(Playing));
        assert!(!Paused.can_transition_to(Ended));
        assert!(!Released.can_transition_to(Loading));
        assert!(!Released.can_transition_to(Error));
    }

    #[test]
    fn test_active_phases() {
        assert!(PlaybackPhase::Playing.is_active());
        assert!(PlaybackPhase::Paused.is_active());
        assert!(PlaybackPhase::Ready.is_active());
        assert!(!PlaybackPhase::Idle.is_active());
        assert!(!PlaybackPhase::Ended.is_active());
        assert!(!PlaybackPhase::Released.is_active());
    }

    #[test]
    fn test_snapshot_serialization() {
        let state = PlaybackState {
            is_playing: true,
            is_buffering: false,
            current_time: 12.5,
            duration: 240.0,
            current_resource: Some("file:///music/track.mp3".to_string()),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: PlaybackState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
