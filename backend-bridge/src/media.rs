//! Media resource identifiers and the local-vs-remote loading convention.

use serde::{Deserialize, Serialize};

use crate::error::NativeError;

/// Classified media resource handed to a native backend for loading.
///
/// Consumers address media with a plain string that is either a local
/// filesystem path or a URI. Backends differ in which loading convention they
/// require (local paths typically need an explicit file scheme), so the core
/// classifies the identifier once and every backend receives the same
/// normalized shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaLocation {
    /// File accessible through the host filesystem.
    Local {
        /// Path exactly as supplied by the caller.
        path: String,
    },
    /// Remote stream addressed by a URI.
    Remote {
        /// Full URI of the media resource.
        url: String,
    },
}

impl MediaLocation {
    /// Classify a raw resource identifier.
    ///
    /// Identifiers containing a scheme (`scheme://...`) are treated as
    /// remote, except for the file scheme which is stripped back to a local
    /// path. Everything else is treated as a local path.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::OpenFailed`] when the identifier is empty or
    /// whitespace only.
    pub fn parse(resource: &str) -> Result<Self, NativeError> {
        let trimmed = resource.trim();
        if trimmed.is_empty() {
            return Err(NativeError::OpenFailed(
                "empty media resource identifier".to_string(),
            ));
        }

        if let Some(path) = trimmed.strip_prefix("file://") {
            return Ok(MediaLocation::Local {
                path: path.to_string(),
            });
        }

        if trimmed.contains("://") {
            return Ok(MediaLocation::Remote {
                url: trimmed.to_string(),
            });
        }

        Ok(MediaLocation::Local {
            path: trimmed.to_string(),
        })
    }

    /// Returns `true` when the resource refers to a remote stream.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaLocation::Remote { .. })
    }

    /// The URI a native backend should load.
    ///
    /// Local paths are prefixed with the file scheme; remote URIs pass
    /// through untouched.
    pub fn native_uri(&self) -> String {
        match self {
            MediaLocation::Local { path } => format!("file://{path}"),
            MediaLocation::Remote { url } => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_local_path() {
        let location = MediaLocation::parse("/music/track.mp3").unwrap();
        assert_eq!(
            location,
            MediaLocation::Local {
                path: "/music/track.mp3".to_string()
            }
        );
        assert!(!location.is_remote());
        assert_eq!(location.native_uri(), "file:///music/track.mp3");
    }

    #[test]
    fn test_classify_remote_uri() {
        let location = MediaLocation::parse("https://example.com/track.mp3").unwrap();
        assert!(location.is_remote());
        assert_eq!(location.native_uri(), "https://example.com/track.mp3");
    }

    #[test]
    fn test_file_scheme_is_local() {
        let location = MediaLocation::parse("file:///music/track.mp3").unwrap();
        assert_eq!(
            location,
            MediaLocation::Local {
                path: "/music/track.mp3".to_string()
            }
        );
    }

    #[test]
    fn test_relative_path_is_local() {
        let location = MediaLocation::parse("media/intro.wav").unwrap();
        assert!(!location.is_remote());
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(MediaLocation::parse("").is_err());
        assert!(MediaLocation::parse("   ").is_err());
    }
}
