//! Shared test fixtures: a scriptable backend whose engines record their lifecycle.

#![allow(dead_code)]

use async_trait::async_trait;
use elementa_core::{AudioReference, Item, ItemId};
use elementa_playback::{
    AudioBackend, AudioEngine, EngineError, EngineStatus, PlaybackConfig, PlaybackEvent,
    SessionCoordinator,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Engine duration handed out by the mock backend
pub const MOCK_DURATION_MS: u64 = 10_000;

/// Lifecycle bookkeeping shared by the backend and its engines
#[derive(Debug, Default)]
pub struct Ledger {
    live: AtomicUsize,
    max_live: AtomicUsize,
    created: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl Ledger {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Index of the first log entry equal to `entry`
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.log().iter().position(|e| e == entry)
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn engine_created(&self, key: &str) {
        self.created.fetch_add(1, Ordering::SeqCst);
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        self.record(format!("ready:{key}"));
    }

    fn engine_released(&self, key: &str) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.record(format!("release:{key}"));
    }
}

/// Backend with per-reference behavior
#[derive(Debug, Default)]
pub struct MockBackend {
    pub ledger: Arc<Ledger>,
    delay: Duration,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    refusing_play: HashSet<String>,
    rejecting_seek: HashSet<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every acquire takes this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Acquire of `url` fails with a network error
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Acquire of `url` never completes
    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    /// Engines for `url` load but refuse to play
    pub fn refusing_play(mut self, url: &str) -> Self {
        self.refusing_play.insert(url.to_string());
        self
    }

    /// Engines for `url` play but reject every seek
    pub fn rejecting_seek(mut self, url: &str) -> Self {
        self.rejecting_seek.insert(url.to_string());
        self
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    async fn acquire(
        &self,
        reference: &AudioReference,
    ) -> elementa_playback::Result<Box<dyn AudioEngine>> {
        let key = reference.to_string();
        self.ledger.record(format!("acquire:{key}"));

        if self.hanging.contains(&key) {
            std::future::pending::<()>().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(&key) {
            return Err(EngineError::Network(format!("{key} unreachable")));
        }

        self.ledger.engine_created(&key);
        Ok(Box::new(MockEngine {
            refuse_play: self.refusing_play.contains(&key),
            refuse_seek: self.rejecting_seek.contains(&key),
            key,
            ledger: Arc::clone(&self.ledger),
            position_ms: 0,
            playing: false,
            released: false,
        }))
    }
}

/// Engine that holds its position still and only moves on seek
#[derive(Debug)]
pub struct MockEngine {
    key: String,
    ledger: Arc<Ledger>,
    position_ms: u64,
    playing: bool,
    released: bool,
    refuse_play: bool,
    refuse_seek: bool,
}

impl AudioEngine for MockEngine {
    fn play(&mut self) -> elementa_playback::Result<()> {
        if self.released {
            return Err(EngineError::Released);
        }
        if self.refuse_play {
            return Err(EngineError::Output("device busy".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> elementa_playback::Result<()> {
        if self.released {
            return Err(EngineError::Released);
        }
        self.playing = false;
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> elementa_playback::Result<u64> {
        if self.released {
            return Err(EngineError::Released);
        }
        if self.refuse_seek {
            return Err(EngineError::Seek("stream is not seekable".to_string()));
        }
        self.position_ms = position_ms.min(MOCK_DURATION_MS);
        Ok(self.position_ms)
    }

    fn status(&mut self) -> EngineStatus {
        EngineStatus {
            position_ms: self.position_ms,
            duration_ms: MOCK_DURATION_MS,
            is_playing: self.playing && !self.released,
            finished: false,
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.playing = false;
            self.ledger.engine_released(&self.key);
        }
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.release();
    }
}

/// Item without audio
pub fn silent_item(id: u32, name: &str) -> Item {
    Item::new(ItemId::new(id), name, &name[..1])
}

/// Item whose audio is the remote `url`
pub fn remote_item(id: u32, name: &str, url: &str) -> Item {
    let mut item = silent_item(id, name);
    item.audio = Some(AudioReference::Remote(url.to_string()));
    item
}

/// Coordinator over `backend` with default config
pub fn coordinator(backend: MockBackend) -> (SessionCoordinator, Arc<Ledger>) {
    coordinator_with(backend, PlaybackConfig::default())
}

pub fn coordinator_with(
    backend: MockBackend,
    config: PlaybackConfig,
) -> (SessionCoordinator, Arc<Ledger>) {
    let ledger = Arc::clone(&backend.ledger);
    (SessionCoordinator::new(Arc::new(backend), config), ledger)
}

/// Everything still retained on an event receiver
///
/// Skips over lag; long runs overflow the channel with position updates.
pub fn drain(events: &mut broadcast::Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    drained
}

/// Let spawned tasks run without moving the clock
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
