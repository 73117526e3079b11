use thiserror::Error;

/// Errors reported by native media backends.
///
/// Implementations convert engine-specific error codes into the variant that
/// best matches the failure so the playback core can classify it for
/// consumers (open/decode failures, runtime engine failures, and session or
/// route setup failures are surfaced differently).
#[derive(Error, Debug)]
pub enum NativeError {
    /// The media item could not be opened or decoded.
    #[error("Failed to open media: {0}")]
    OpenFailed(String),

    /// The native engine failed while playback was in progress.
    #[error("Native engine failure: {0}")]
    EngineFailure(String),

    /// Backend or audio-session setup failed (e.g., session activation,
    /// output route configuration).
    #[error("Backend setup failed: {0}")]
    SetupFailed(String),

    /// The backend does not support the requested operation.
    #[error("Operation not supported by backend: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NativeError>;
