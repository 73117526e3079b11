//! # Audio Provider
//!
//! Entry point for hosting players. An [`AudioProvider`] validates the
//! shared [`PlayerConfig`] once, owns the diagnostics bus, and constructs
//! players for whichever backend strategy the platform integration offers.
//!
//! All constructed players share the provider's diagnostics bus, so one
//! subscription observes every player the provider created.

use crate::adapters::events::MediaEventAdapter;
use crate::adapters::listener::ListenerAdapter;
use crate::adapters::observer::ObserverAdapter;
use crate::adapters::polling::PollingAdapter;
use crate::controller::{AudioPlayer, AudioUpdates};
use backend_bridge::{EventBackend, ListenerBackend, ObserverBackend, PollingBackend};
use core_runtime::{DiagnosticsBus, PlayerConfig, Result};
use std::sync::Arc;

pub struct AudioProvider {
    config: PlayerConfig,
    diagnostics: DiagnosticsBus,
}

impl AudioProvider {
    /// Creates a provider with validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `config` fails validation.
    pub fn new(config: PlayerConfig) -> Result<Self> {
        config.validate()?;
        let diagnostics = DiagnosticsBus::new(config.diagnostics_buffer);
        Ok(Self {
            config,
            diagnostics,
        })
    }

    /// Creates a provider with default configuration.
    pub fn with_defaults() -> Self {
        // The default configuration always validates.
        Self {
            config: PlayerConfig::default(),
            diagnostics: DiagnosticsBus::default(),
        }
    }

    /// Diagnostics bus shared by every player this provider creates.
    pub fn diagnostics(&self) -> &DiagnosticsBus {
        &self.diagnostics
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Player over a position/duration-getter backend.
    pub fn polling_player<B>(
        &self,
        backend: B,
        updates: Arc<dyn AudioUpdates>,
    ) -> Arc<dyn AudioPlayer>
    where
        B: PollingBackend + 'static,
    {
        Arc::new(PollingAdapter::spawn(
            backend,
            updates,
            &self.config,
            self.diagnostics.clone(),
        ))
    }

    /// Player over a periodic-time-observer backend.
    pub fn observer_player<B>(
        &self,
        backend: B,
        updates: Arc<dyn AudioUpdates>,
    ) -> Arc<dyn AudioPlayer>
    where
        B: ObserverBackend + 'static,
    {
        Arc::new(ObserverAdapter::spawn(
            backend,
            updates,
            &self.config,
            self.diagnostics.clone(),
        ))
    }

    /// Player over a media-element event backend.
    pub fn media_event_player<B>(
        &self,
        backend: B,
        updates: Arc<dyn AudioUpdates>,
    ) -> Arc<dyn AudioPlayer>
    where
        B: EventBackend + 'static,
    {
        Arc::new(MediaEventAdapter::spawn(
            backend,
            updates,
            self.diagnostics.clone(),
        ))
    }

    /// Player over a listener-callback engine backend.
    pub fn listener_player<B>(
        &self,
        backend: B,
        updates: Arc<dyn AudioUpdates>,
    ) -> Arc<dyn AudioPlayer>
    where
        B: ListenerBackend + 'static,
    {
        Arc::new(ListenerAdapter::spawn(
            backend,
            updates,
            self.diagnostics.clone(),
        ))
    }
}

impl Default for AudioProvider {
    fn default() -> Self {
        Self::with_defaults()
    }
}
