//! # Diagnostics Event Channel
//!
//! A structured diagnostics channel for the playback core built on
//! `tokio::sync::broadcast`. Backend adapters publish a [`PlayerDiagnostic`]
//! for every notable lifecycle step; tooling, log forwarders, and tests
//! subscribe independently.
//!
//! This channel is observational only: consumer-facing playback callbacks
//! flow through the controller contract, never through this bus, and a bus
//! without subscribers drops events silently.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{DiagnosticsBus, PlayerDiagnostic};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = DiagnosticsBus::new(64);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(PlayerDiagnostic::Started {
//!     resource: "https://example.com/track.mp3".to_string(),
//! });
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback started");
//! # }
//! ```
//!
//! Subscribers that fall behind receive `RecvError::Lagged` and can keep
//! consuming newer events; `RecvError::Closed` signals that every bus handle
//! has been dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the diagnostics channel.
pub const DEFAULT_DIAGNOSTICS_BUFFER: usize = 64;

/// Failure classification carried by [`PlayerDiagnostic::Faulted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    /// The resource could not be opened or decoded.
    Load,
    /// The native engine failed during playback.
    Playback,
    /// Backend/session setup failed.
    Configuration,
}

/// Severity levels for filtering and log forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Debug,
    Info,
    Error,
}

/// One diagnostic event from a backend adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlayerDiagnostic {
    /// A media item began loading.
    Loading {
        /// Resource identifier as supplied by the caller.
        resource: String,
    },
    /// The backend reported it can produce frames.
    Ready {
        /// Resolved duration in seconds (0 when unknown).
        duration_secs: f64,
    },
    /// Playback started for a freshly loaded item.
    Started {
        /// Resource identifier.
        resource: String,
    },
    /// Playback paused.
    Paused {
        /// Position in seconds when paused.
        position_secs: f64,
    },
    /// Playback resumed from a paused position.
    Resumed {
        /// Position in seconds when resumed.
        position_secs: f64,
    },
    /// A seek was applied (after clamping).
    SeekApplied {
        /// Position the caller requested, in seconds.
        requested_secs: f64,
        /// Position actually applied, in seconds.
        applied_secs: f64,
    },
    /// The item played to its natural end.
    Completed {
        /// Resource identifier of the finished item.
        resource: String,
    },
    /// A native failure was converted and reported to the consumer.
    Faulted {
        /// Failure classification.
        kind: FaultKind,
        /// Human-readable failure description.
        message: String,
    },
    /// The adapter released its native resources.
    Released,
}

impl PlayerDiagnostic {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerDiagnostic::Loading { .. } => "Media loading",
            PlayerDiagnostic::Ready { .. } => "Backend ready",
            PlayerDiagnostic::Started { .. } => "Playback started",
            PlayerDiagnostic::Paused { .. } => "Playback paused",
            PlayerDiagnostic::Resumed { .. } => "Playback resumed",
            PlayerDiagnostic::SeekApplied { .. } => "Seek applied",
            PlayerDiagnostic::Completed { .. } => "Track completed",
            PlayerDiagnostic::Faulted { .. } => "Playback fault",
            PlayerDiagnostic::Released => "Player released",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            PlayerDiagnostic::Faulted { .. } => DiagnosticSeverity::Error,
            PlayerDiagnostic::Started { .. }
            | PlayerDiagnostic::Completed { .. }
            | PlayerDiagnostic::Released => DiagnosticSeverity::Info,
            _ => DiagnosticSeverity::Debug,
        }
    }
}

/// Broadcast channel for [`PlayerDiagnostic`] events.
///
/// Cloning the bus produces another publisher handle; each `subscribe()`
/// creates an independent receiver. Emission never blocks and never fails
/// the publisher: a bus without subscribers simply drops the event.
#[derive(Clone)]
pub struct DiagnosticsBus {
    sender: broadcast::Sender<PlayerDiagnostic>,
}

impl DiagnosticsBus {
    /// Creates a new bus with the specified per-subscriber buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    pub fn emit(&self, event: PlayerDiagnostic) {
        // No subscribers is normal during early startup and in tests.
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber receiving all future events.
    pub fn subscribe(&self) -> Receiver<PlayerDiagnostic> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for DiagnosticsBus {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_BUFFER)
    }
}

impl fmt::Debug for DiagnosticsBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
