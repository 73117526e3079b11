//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Player configuration
//! - Diagnostics event channel
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the playback crates depend on.
//! It establishes the logging conventions, the configuration surface, and
//! the structured diagnostics broadcasting used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use events::{DiagnosticsBus, FaultKind, PlayerDiagnostic};
