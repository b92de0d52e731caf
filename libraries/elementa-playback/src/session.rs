//! Playback session
//!
//! Owns the single active engine. Every engine handed out by the backend passes through
//! here and is released here; the coordinator only ever holds the session behind a lock.

use crate::engine::{AudioBackend, AudioEngine, EngineStatus};
use crate::error::{EngineError, Result};
use crate::simulated::SimulatedEngine;
use crate::types::PlaybackMode;
use elementa_core::AudioReference;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Engine counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Engines that entered the session (real and simulated)
    pub acquired: u64,

    /// Engines released
    pub released: u64,
}

impl SessionStats {
    /// Engines currently alive; never more than one
    pub fn live(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// The installed engine and what it belongs to
struct ActiveEngine {
    generation: u64,
    mode: PlaybackMode,
    engine: Box<dyn AudioEngine>,
    pump: Option<JoinHandle<()>>,
}

/// Lifecycle owner for the one active engine
pub struct PlaybackSession {
    backend: Arc<dyn AudioBackend>,
    acquire_timeout: Duration,
    simulated_duration_ms: u64,
    active: Option<ActiveEngine>,
    stats: SessionStats,
}

impl PlaybackSession {
    /// Create an empty session
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        acquire_timeout: Duration,
        simulated_duration_ms: u64,
    ) -> Self {
        Self {
            backend,
            acquire_timeout,
            simulated_duration_ms,
            active: None,
            stats: SessionStats::default(),
        }
    }

    /// Load a new engine from the backend
    ///
    /// Any installed engine is released first, so two engines never coexist. The backend
    /// call is bounded by the acquire timeout.
    pub async fn acquire(&mut self, reference: &AudioReference) -> Result<Box<dyn AudioEngine>> {
        self.release();

        debug!(reference = %reference, "Acquiring engine");
        let engine = tokio::time::timeout(self.acquire_timeout, self.backend.acquire(reference))
            .await
            .map_err(|_| EngineError::Timeout(self.acquire_timeout))??;

        self.stats.acquired += 1;
        Ok(engine)
    }

    /// Release an acquired engine that will not be installed
    pub fn discard(&mut self, mut engine: Box<dyn AudioEngine>) {
        engine.release();
        self.stats.released += 1;
        debug!("Discarded superseded engine");
    }

    /// Install an acquired engine and start it
    ///
    /// If the engine refuses to play it is released and the error returned.
    pub fn install(
        &mut self,
        generation: u64,
        mode: PlaybackMode,
        mut engine: Box<dyn AudioEngine>,
    ) -> Result<EngineStatus> {
        self.release();

        if let Err(e) = engine.play() {
            engine.release();
            self.stats.released += 1;
            return Err(e);
        }

        let status = engine.status();
        self.active = Some(ActiveEngine {
            generation,
            mode,
            engine,
            pump: None,
        });

        info!(generation, mode = %mode, duration_ms = status.duration_ms, "Engine installed");
        Ok(status)
    }

    /// Install and start a simulated engine
    pub fn install_simulated(&mut self, generation: u64) -> EngineStatus {
        self.release();

        let mut engine = SimulatedEngine::new(self.simulated_duration_ms);
        engine.start();
        let status = engine.status();

        self.stats.acquired += 1;
        self.active = Some(ActiveEngine {
            generation,
            mode: PlaybackMode::Simulated,
            engine: Box::new(engine),
            pump: None,
        });

        info!(generation, duration_ms = status.duration_ms, "Simulated engine installed");
        status
    }

    /// Attach the status pump feeding the engine of `generation`
    ///
    /// The task is aborted right away if that engine is no longer installed.
    pub fn attach_pump(&mut self, generation: u64, pump: JoinHandle<()>) {
        match self.active.as_mut() {
            Some(active) if active.generation == generation => {
                if let Some(previous) = active.pump.replace(pump) {
                    previous.abort();
                }
            }
            _ => pump.abort(),
        }
    }

    /// Stop and free the installed engine
    ///
    /// Aborts its status pump. A no-op when nothing is installed.
    pub fn release(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Some(pump) = active.pump.take() {
                pump.abort();
            }
            active.engine.release();
            self.stats.released += 1;
            debug!(generation = active.generation, mode = %active.mode, "Engine released");
        }
    }

    /// Release the installed engine if it predates `generation`
    pub fn release_older_than(&mut self, generation: u64) {
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.generation < generation)
        {
            self.release();
        }
    }

    /// Whether an engine is installed
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Generation of the installed engine
    pub fn generation(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.generation)
    }

    /// Mode of the installed engine
    pub fn mode(&self) -> Option<PlaybackMode> {
        self.active.as_ref().map(|active| active.mode)
    }

    fn engine(&mut self) -> Result<&mut Box<dyn AudioEngine>> {
        self.active
            .as_mut()
            .map(|active| &mut active.engine)
            .ok_or(EngineError::Released)
    }

    /// Start or resume the installed engine
    pub fn play(&mut self) -> Result<EngineStatus> {
        let engine = self.engine()?;
        engine.play()?;
        Ok(engine.status())
    }

    /// Pause the installed engine
    pub fn pause(&mut self) -> Result<EngineStatus> {
        let engine = self.engine()?;
        engine.pause()?;
        Ok(engine.status())
    }

    /// Flip between playing and paused
    pub fn toggle(&mut self) -> Result<EngineStatus> {
        let engine = self.engine()?;
        if engine.status().is_playing {
            engine.pause()?;
        } else {
            engine.play()?;
        }
        Ok(engine.status())
    }

    /// Seek the installed engine; the engine clamps to `[0, duration]`
    pub fn seek(&mut self, position_ms: u64) -> Result<EngineStatus> {
        let engine = self.engine()?;
        engine.seek(position_ms)?;
        Ok(engine.status())
    }

    /// Status of the installed engine
    pub fn status(&mut self) -> Option<EngineStatus> {
        self.engine().ok().map(|engine| engine.status())
    }

    /// Status of the engine of `generation`, `None` once it has been replaced or released
    pub fn status_for(&mut self, generation: u64) -> Option<EngineStatus> {
        match self.active.as_mut() {
            Some(active) if active.generation == generation => Some(active.engine.status()),
            _ => None,
        }
    }

    /// Engine counters
    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("generation", &self.generation())
            .field("mode", &self.mode())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SilentBackend;
    use std::time::Duration;

    fn session() -> PlaybackSession {
        PlaybackSession::new(Arc::new(SilentBackend), Duration::from_secs(10), 180_000)
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_install_and_release() {
        let mut session = session();
        let status = session.install_simulated(1);

        assert!(status.is_playing);
        assert_eq!(status.duration_ms, 180_000);
        assert_eq!(session.mode(), Some(PlaybackMode::Simulated));

        session.release();
        session.release();
        assert!(!session.is_active());
        assert_eq!(session.stats(), SessionStats { acquired: 1, released: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn status_is_fenced_by_generation() {
        let mut session = session();
        session.install_simulated(3);

        assert!(session.status_for(3).is_some());
        assert!(session.status_for(2).is_none());

        session.install_simulated(4);
        assert!(session.status_for(3).is_none());
        assert_eq!(session.stats().live(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_acquire_leaves_nothing_installed() {
        let mut session = session();
        session.install_simulated(1);

        let result = session.acquire(&AudioReference::Remote("x".into())).await;
        assert!(matches!(result, Err(EngineError::Output(_))));
        assert!(!session.is_active());
        assert_eq!(session.stats().live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn operations_without_engine_fail() {
        let mut session = session();
        assert!(matches!(session.toggle(), Err(EngineError::Released)));
        assert!(matches!(session.seek(10), Err(EngineError::Released)));
        assert!(session.status().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn release_older_than_keeps_newer_engine() {
        let mut session = session();
        session.install_simulated(5);

        session.release_older_than(5);
        assert!(session.is_active());

        session.release_older_than(6);
        assert!(!session.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn pump_for_stale_generation_is_aborted() {
        let mut session = session();
        session.install_simulated(2);

        let stale = tokio::spawn(std::future::pending::<()>());
        let stale_handle = stale.abort_handle();
        session.attach_pump(1, stale);

        let current = tokio::spawn(std::future::pending::<()>());
        let current_handle = current.abort_handle();
        session.attach_pump(2, current);

        tokio::task::yield_now().await;
        assert!(stale_handle.is_finished());
        assert!(!current_handle.is_finished());

        session.release();
        tokio::task::yield_now().await;
        assert!(current_handle.is_finished());
    }
}
