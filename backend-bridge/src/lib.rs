//! # Native Backend Bridge
//!
//! Capability traits that every native media backend must implement.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the native
//! audio engines it drives (a decoder pipeline, a desktop media framework, a
//! system AV player, a browser media element). Each trait represents one way
//! a native engine exposes progress and lifecycle information:
//!
//! - [`NativeControls`](controls::NativeControls) - base control surface
//!   shared by all backends (load, play, pause, seek, release)
//! - [`PollingBackend`](controls::PollingBackend) - pull-style position and
//!   duration accessors, sampled by the core on an interval
//! - [`ObserverBackend`](controls::ObserverBackend) - native periodic time
//!   observer registered by the core, removed on release
//! - [`EventBackend`](controls::EventBackend) - discrete media-element
//!   events (`canplay`, `timeupdate`, `ended`, `error`)
//! - [`ListenerBackend`](controls::ListenerBackend) - push-based state and
//!   position notifications from a native listener
//!
//! ## Error Handling
//!
//! All backend traits report failures through [`NativeError`](error::NativeError).
//! Implementations should convert engine-specific error codes into the
//! matching variant so the core can classify the failure for consumers.
//!
//! ## Thread Safety
//!
//! Trait bounds use the [`platform`] marker traits: `Send + Sync` on native
//! targets, relaxed on `wasm32` where browser-provided handles are
//! single-threaded.

pub mod controls;
pub mod error;
pub mod media;
pub mod platform;

pub use controls::{
    EventBackend, ListenerBackend, MediaElementEvent, NativeControls, ObserverBackend,
    ObserverEvent, ObserverTick, PlayerNotification, PollingBackend,
};
pub use error::{NativeError, Result};
pub use media::MediaLocation;
pub use platform::{PlatformSend, PlatformSendSync};
