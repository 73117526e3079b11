//! Playback error taxonomy reported to consumers.
//!
//! Backend-native failures ([`backend_bridge::NativeError`]) are folded into
//! three consumer-facing categories so callers can react uniformly across
//! backends: the resource could not be loaded, the engine failed mid-stream,
//! or the player itself could not be set up.

use backend_bridge::NativeError;
use core_runtime::FaultKind;
use thiserror::Error;

/// Failure reported through the playback callbacks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The resource could not be opened or decoded.
    #[error("Failed to load '{resource}': {message}")]
    LoadFailure { resource: String, message: String },

    /// The native engine failed while playing.
    #[error("Playback failed: {message}")]
    PlaybackFailure { message: String },

    /// The player or audio session could not be configured.
    #[error("Player configuration failed: {message}")]
    ConfigurationFailure { message: String },
}

impl PlaybackError {
    /// Maps a backend-native failure into the consumer taxonomy.
    ///
    /// `resource` names the item being handled when the failure occurred and
    /// is attached to load failures for context.
    pub fn from_native(err: NativeError, resource: &str) -> Self {
        match err {
            NativeError::OpenFailed(message) => PlaybackError::LoadFailure {
                resource: resource.to_string(),
                message,
            },
            io @ NativeError::Io(_) => PlaybackError::LoadFailure {
                resource: resource.to_string(),
                message: io.to_string(),
            },
            NativeError::EngineFailure(message) => PlaybackError::PlaybackFailure { message },
            NativeError::SetupFailed(message) => {
                PlaybackError::ConfigurationFailure { message }
            }
            NativeError::Unsupported(message) => PlaybackError::PlaybackFailure { message },
        }
    }

    /// Diagnostic classification for this failure.
    pub fn fault_kind(&self) -> FaultKind {
        match self {
            PlaybackError::LoadFailure { .. } => FaultKind::Load,
            PlaybackError::PlaybackFailure { .. } => FaultKind::Playback,
            PlaybackError::ConfigurationFailure { .. } => FaultKind::Configuration,
        }
    }
}
