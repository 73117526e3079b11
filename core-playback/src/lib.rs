//! # Core Playback Module
//!
//! Backend-independent audio playback control. The crate exposes one
//! control surface ([`AudioPlayer`]) and one callback sink
//! ([`AudioUpdates`]) over four backend integration strategies, so
//! consumers drive playback identically whether the native engine is
//! poll-only, observer-based, event-driven, or listener-driven.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                   AudioProvider                     │
//! │        (config validation, diagnostics bus)         │
//! └───────────┬────────────────────────────────────────┘
//!             │ constructs
//! ┌───────────▼────────────────────────────────────────┐
//! │   PlayerHandle ──commands──► adapter event loop     │
//! │                              │ PlayerSession        │
//! │                              │  (state machine)     │
//! │                              ▼                      │
//! │            native backend (backend-bridge traits)   │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! Each player is a single spawned event loop owning its native backend:
//! control calls and native notifications are serialized through it, so
//! snapshots reach the consumer in a well-defined order.

pub mod adapters;
pub mod controller;
pub mod error;
pub mod provider;
pub mod session;
pub mod state;

pub use adapters::events::MediaEventAdapter;
pub use adapters::listener::ListenerAdapter;
pub use adapters::observer::ObserverAdapter;
pub use adapters::polling::PollingAdapter;
pub use adapters::PlayerHandle;
pub use controller::{AudioPlayer, AudioUpdates};
pub use error::PlaybackError;
pub use provider::AudioProvider;
pub use state::{PlaybackPhase, PlaybackState};
