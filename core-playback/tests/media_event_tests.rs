//! Integration tests for the media-event adapter using a fake media
//! element whose event stream the tests drive by hand.

use async_trait::async_trait;
use backend_bridge::{EventBackend, MediaElementEvent, MediaLocation, NativeControls, Result};
use core_playback::{AudioProvider, AudioUpdates, PlaybackError, PlaybackState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct ElementInner {
    playing: AtomicBool,
    release_count: AtomicUsize,
    loaded: Mutex<Option<String>>,
    sender: Mutex<Option<UnboundedSender<MediaElementEvent>>>,
    seeks: Mutex<Vec<f64>>,
}

impl ElementInner {
    fn send(&self, event: MediaElementEvent) -> bool {
        match self.sender.lock().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

struct FakeElement {
    inner: Arc<ElementInner>,
}

impl FakeElement {
    fn new() -> (Self, Arc<ElementInner>) {
        let inner = Arc::new(ElementInner::default());
        (
            Self {
                inner: inner.clone(),
            },
            inner,
        )
    }
}

#[async_trait]
impl NativeControls for FakeElement {
    async fn load(&mut self, location: &MediaLocation) -> Result<()> {
        *self.inner.loaded.lock() = Some(location.native_uri());
        Ok(())
    }

    async fn play_native(&mut self) -> Result<()> {
        self.inner.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause_native(&mut self) -> Result<()> {
        self.inner.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn seek_native(&mut self, seconds: f64) -> Result<()> {
        self.inner.seeks.lock().push(seconds);
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.inner.playing.store(false, Ordering::SeqCst);
        self.inner.release_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl EventBackend for FakeElement {
    async fn events(&mut self) -> Result<mpsc::UnboundedReceiver<MediaElementEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.sender.lock() = Some(tx);
        Ok(rx)
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

const TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_optimistic_start_then_canplay_confirms() {
    let (element, inner) = FakeElement::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = AudioProvider::with_defaults().media_event_player(element, updates.clone());

    player.play("https://example.com/a.ogg").await;

    // Intent is visible before the element reports canplay.
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing && s.duration == 0.0))
        .await
    );
    assert_eq!(updates.ready_count(), 0);

    assert!(inner.send(MediaElementEvent::CanPlay { duration: 120.0 }));
    assert!(wait_until(TIMEOUT, || updates.ready_count() == 1).await);

    let state = updates.last_snapshot().unwrap();
    assert!(state.is_playing);
    assert!(!state.is_buffering);
    assert_eq!(state.duration, 120.0);

    player.clean_up().await;
}

#[tokio::test]
async fn test_pause_before_canplay_leaves_item_ready_not_playing() {
    let (element, inner) = FakeElement::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = AudioProvider::with_defaults().media_event_player(element, updates.clone());

    player.play("https://example.com/a.ogg").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );

    player.pause().await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| !s.is_playing))
        .await
    );
    assert!(!inner.playing.load(Ordering::SeqCst), "element still playing");

    assert!(inner.send(MediaElementEvent::CanPlay { duration: 120.0 }));
    assert!(wait_until(TIMEOUT, || updates.ready_count() > 0).await);
    assert!(!updates.last_snapshot().unwrap().is_playing);

    player.clean_up().await;
}

#[tokio::test]
async fn test_timeupdates_drive_snapshots_until_ended() {
    let (element, inner) = FakeElement::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = AudioProvider::with_defaults().media_event_player(element, updates.clone());

    player.play("https://example.com/a.ogg").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );
    assert!(inner.send(MediaElementEvent::CanPlay { duration: 10.0 }));
    assert!(inner.send(MediaElementEvent::TimeUpdate {
        position: 9.5,
        duration: 10.0,
    }));
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.current_time == 9.5))
        .await
    );

    assert!(inner.send(MediaElementEvent::Ended));
    assert!(
        wait_until(TIMEOUT, || updates.last_snapshot().is_some_and(|s| {
            !s.is_playing && s.current_resource.is_none() && s.current_time == 0.0
        }))
        .await
    );
    assert_eq!(updates.last_snapshot().unwrap().duration, 10.0);

    player.clean_up().await;
}

#[tokio::test]
async fn test_error_while_loading_is_load_failure() {
    let (element, inner) = FakeElement::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = AudioProvider::with_defaults().media_event_player(element, updates.clone());

    player.play("https://example.com/missing.ogg").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );

    assert!(inner.send(MediaElementEvent::Error {
        message: "MEDIA_ERR_NETWORK".to_string(),
    }));
    assert!(wait_until(TIMEOUT, || !updates.errors.lock().is_empty()).await);

    let errors = updates.errors.lock();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        PlaybackError::LoadFailure { resource, message } => {
            assert_eq!(resource, "https://example.com/missing.ogg");
            assert_eq!(message, "MEDIA_ERR_NETWORK");
        }
        other => panic!("expected load failure, got {other:?}"),
    }
    drop(errors);
    assert_eq!(updates.ready_count(), 0);

    player.clean_up().await;
}

#[tokio::test]
async fn test_error_after_ready_is_playback_failure() {
    let (element, inner) = FakeElement::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = AudioProvider::with_defaults().media_event_player(element, updates.clone());

    player.play("https://example.com/a.ogg").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );
    assert!(inner.send(MediaElementEvent::CanPlay { duration: 60.0 }));
    assert!(wait_until(TIMEOUT, || updates.ready_count() > 0).await);

    assert!(inner.send(MediaElementEvent::Error {
        message: "MEDIA_ERR_DECODE".to_string(),
    }));
    assert!(wait_until(TIMEOUT, || !updates.errors.lock().is_empty()).await);
    assert!(matches!(
        updates.errors.lock()[0],
        PlaybackError::PlaybackFailure { .. }
    ));

    player.clean_up().await;
}

#[tokio::test]
async fn test_stale_events_ignored_after_supersede() {
    let (element, inner) = FakeElement::new();
    let updates = Arc::new(RecordingUpdates::default());
    let player = AudioProvider::with_defaults().media_event_player(element, updates.clone());

    player.play("https://example.com/a.ogg").await;
    assert!(
        wait_until(TIMEOUT, || updates
            .last_snapshot()
            .is_some_and(|s| s.is_playing))
        .await
    );
    let old_tx = inner.sender.lock().clone().unwrap();

    player.play("https://example.com/b.ogg").await;
    assert!(
        wait_until(TIMEOUT, || updates.last_snapshot().is_some_and(|s| {
            s.current_resource.as_deref() == Some("https://example.com/b.ogg")
        }))
        .await
    );

    // The first item's event stream was detached during the supersede.
    assert!(old_tx
        .send(MediaElementEvent::Error {
            message: "stale".to_string(),
        })
        .is_err());
    assert!(updates.errors.lock().is_empty());

    player.clean_up().await;
    assert_eq!(inner.release_count.load(Ordering::SeqCst), 1);
}
