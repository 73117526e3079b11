//! Workspace facade crate.
//!
//! Host applications can depend on `soundbridge` alone: it re-exports the
//! playback control surface, the backend capability traits, and the runtime
//! configuration types from the individual workspace crates.

pub use backend_bridge::{
    EventBackend, ListenerBackend, MediaElementEvent, MediaLocation, NativeControls, NativeError,
    ObserverBackend, ObserverEvent, ObserverTick, PlayerNotification, PollingBackend,
};
pub use core_playback::{
    AudioPlayer, AudioProvider, AudioUpdates, PlaybackError, PlaybackPhase, PlaybackState,
};
pub use core_runtime::{
    logging::{init_logging, LogFormat, LoggingConfig},
    DiagnosticsBus, FaultKind, PlayerConfig, PlayerDiagnostic,
};
