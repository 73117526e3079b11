//! Integration tests for the observer adapter using a fake engine whose
//! periodic observer the tests drive by hand.

use async_trait::async_trait;
use backend_bridge::{
    MediaLocation, NativeControls, NativeError, ObserverBackend, ObserverEvent, ObserverTick,
    Result,
};
use core_playback::{AudioProvider, AudioUpdates, PlaybackError, PlaybackState};
use core_runtime::PlayerConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct EngineInner {
    fail_initialize: AtomicBool,
    observe_count: AtomicUsize,
    cancel_count: AtomicUsize,
    release_count: AtomicUsize,
    loaded: Mutex<Option<String>>,
    sender: Mutex<Option<UnboundedSender<ObserverEvent>>>,
    seeks: Mutex<Vec<f64>>,
}

impl EngineInner {
    /// Delivers an event through the current observer registration.
    fn send(&self, event: ObserverEvent) -> bool {
        match self.sender.lock().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    fn tick(&self, position: f64, duration: f64) -> bool {
        self.send(ObserverEvent::Time(ObserverTick { position, duration }))
    }
}

struct FakeAvEngine {
    inner: Arc<EngineInner>,
}

impl FakeAvEngine {
    fn new() -> (Self, Arc<EngineInner>) {
        let inner = Arc::new(EngineInner::default());
        (
            Self {
                inner: inner.clone(),
            },
            inner,
        )
    }
}

#[async_trait]
impl NativeControls for FakeAvEngine {
    async fn initialize(&mut self) -> Result<()> {
        if self.inner.fail_initialize.load(Ordering::SeqCst) {
            return Err(NativeError::SetupFailed(
                "audio session activation denied".to_string(),
            ));
        }
        Ok(())
    }

    async fn load(&mut self, location: &MediaLocation) -> Result<()> {
        *self.inner.loaded.lock() = Some(location.native_uri());
        Ok(())
    }

    async fn play_native(&mut self) -> Result<()> {
        Ok(())
    }

    async fn pause_native(&mut self) -> Result<()> {
        Ok(())
    }

    async fn seek_native(&mut self, seconds: f64) -> Result<()> {
        self.inner.seeks.lock().push(seconds);
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.inner.release_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ObserverBackend for FakeAvEngine {
    async fn observe(
        &mut self,
        _interval: Duration,
    ) -> Result<mpsc::UnboundedReceiver<ObserverEvent>> {
        self.inner.observe_count.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.sender.lock() = Some(tx);
        Ok(rx)
    }

    async fn cancel_observer(&mut self) -> Result<()> {
        self.inner.cancel_count.fetch_add(1, Ordering::SeqCst);
        *self.inner.sender.lock() = None;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingUpdates {
    snapshots: Mutex<Vec<PlaybackState>>,
    ready_calls: AtomicUsize,
    errors: Mutex<Vec<PlaybackError>>,
}

impl AudioUpdates for RecordingUpdates {
    fn on_progress(&self, state: PlaybackState) {
        self.snapshots.lock().push(state);
    }

    fn on_ready(&self) {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, error: PlaybackError) {
        self.errors.lock().push(error);
    }
}

impl RecordingUpdates {
    fn last_snapshot(&self) -> Option<PlaybackState> {
        self.snapshots.lock().last().cloned()
    }

    fn snapshot_count(&self) -> usize {
        self.snapshots.lock().len()
    }

    fn ready_count(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }
}

async fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    predicate()
}

fn provider() -> AudioProvider {
    AudioProvider::new(PlayerConfig::new().with_progress_interval(Duration::from_millis(20)))
        .unwrap()
}

const TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_ready_comes_from_first_usable_tick() {
    let (engine, inner) = FakeAvEngine::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    player.play("https://example.com/a.m4a").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );

    // Timing not yet resolved by the engine: the tick is dropped whole,
    // so neither readiness nor a snapshot with its position goes out.
    let settled = updates.snapshot_count();
    assert!(inner.tick(0.5, f64::NAN));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(updates.snapshot_count(), settled);
    assert_eq!(updates.ready_count(), 0);
    assert_eq!(updates.last_snapshot().unwrap().current_time, 0.0);

    assert!(inner.tick(1.0, 240.0));
    assert!(wait_until(TIMEOUT, || updates.ready_count() == 1).await);
    assert_eq!(updates.last_snapshot().unwrap().duration, 240.0);

    // Later ticks never repeat the readiness callback.
    assert!(inner.tick(2.0, 240.0));
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.current_time == 2.0))
        .await
    );
    assert_eq!(updates.ready_count(), 1);

    player.clean_up().await;
}

#[tokio::test]
async fn test_ticks_without_usable_duration_are_suppressed() {
    let (engine, inner) = FakeAvEngine::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    player.play("https://example.com/a.m4a").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );

    let settled = updates.snapshot_count();
    assert!(inner.tick(0.5, f64::NAN));
    assert!(inner.tick(0.7, 0.0));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(updates.snapshot_count(), settled);
    assert_eq!(updates.ready_count(), 0);

    // The first tick carrying a real duration flows through normally.
    assert!(inner.tick(1.0, 120.0));
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.current_time == 1.0 && s.duration == 120.0))
        .await
    );
    assert_eq!(updates.ready_count(), 1);

    player.clean_up().await;
}

#[tokio::test]
async fn test_nan_position_tick_is_discarded() {
    let (engine, inner) = FakeAvEngine::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    player.play("https://example.com/a.m4a").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );

    assert!(inner.tick(3.0, 100.0));
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.current_time == 3.0))
        .await
    );

    assert!(inner.tick(f64::NAN, 100.0));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(updates.last_snapshot().unwrap().current_time, 3.0);

    player.clean_up().await;
}

#[tokio::test]
async fn test_end_notification_completes_item() {
    let (engine, inner) = FakeAvEngine::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    player.play("https://example.com/a.m4a").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );
    assert!(inner.tick(299.0, 300.0));
    assert!(inner.send(ObserverEvent::Ended));

    assert!(
        wait_until(TIMEOUT, || updates.last_snapshot().is_some_and(|s| {
            !s.is_playing && s.current_resource.is_none() && s.current_time == 0.0
        }))
        .await
    );
    assert_eq!(updates.last_snapshot().unwrap().duration, 300.0);
    assert_eq!(inner.cancel_count.load(Ordering::SeqCst), 1);

    player.clean_up().await;
}

#[tokio::test]
async fn test_supersede_cancels_previous_registration() {
    let (engine, inner) = FakeAvEngine::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    player.play("https://example.com/a.m4a").await;
    assert!(wait_until(TIMEOUT, || inner.observe_count.load(Ordering::SeqCst) == 1).await);
    let old_tx = inner.sender.lock().clone().unwrap();

    player.play("https://example.com/b.m4a").await;
    assert!(wait_until(TIMEOUT, || inner.observe_count.load(Ordering::SeqCst) == 2).await);
    assert_eq!(inner.cancel_count.load(Ordering::SeqCst), 1);

    // The superseded registration's receiver is gone; events from the old
    // item have nowhere to land.
    assert!(old_tx
        .send(ObserverEvent::Time(ObserverTick {
            position: 50.0,
            duration: 300.0,
        }))
        .is_err());

    player.clean_up().await;

    // Every registration taken was also cancelled.
    assert_eq!(
        inner.observe_count.load(Ordering::SeqCst),
        inner.cancel_count.load(Ordering::SeqCst)
    );
    assert_eq!(inner.release_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_initialize_failure_is_configuration_error() {
    let (engine, inner) = FakeAvEngine::new();
    inner.fail_initialize.store(true, Ordering::SeqCst);
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    assert!(wait_until(TIMEOUT, || !updates.errors.lock().is_empty()).await);
    assert!(matches!(
        updates.errors.lock()[0],
        PlaybackError::ConfigurationFailure { .. }
    ));

    player.clean_up().await;
}

#[tokio::test]
async fn test_seek_forwards_clamped_position() {
    let (engine, inner) = FakeAvEngine::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = provider().observer_player(engine, updates.clone());

    player.play("https://example.com/a.m4a").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );
    assert!(inner.tick(1.0, 180.0));
    assert!(wait_until(TIMEOUT, || updates.ready_count() > 0).await);

    player.seek(500.0).await;
    assert!(wait_until(TIMEOUT, || inner.seeks.lock().as_slice() == [180.0]).await);
    assert_eq!(updates.last_snapshot().unwrap().current_time, 180.0);

    player.clean_up().await;
}
