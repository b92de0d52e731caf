//! Simulated playback
//!
//! Stands in for a real engine when an item has no audio or its audio cannot be loaded.
//! The position advances in whole seconds from a [`tokio::time::Instant`] anchor, so it
//! follows the runtime clock (including a paused test clock).

use crate::engine::{AudioEngine, EngineStatus};
use crate::error::{EngineError, Result};
use tokio::time::Instant;
use tracing::debug;

/// Granularity of the synthetic position
const STEP_MS: u64 = 1000;

/// Synthetic engine with a fixed duration
///
/// Reaching the duration stops it for good: it reports `finished`, pins the position at
/// the duration, and ignores further `play` and `seek` calls.
#[derive(Debug)]
pub struct SimulatedEngine {
    duration_ms: u64,

    /// Position when the anchor was set (or the frozen position while paused)
    base_ms: u64,

    /// Set while playing
    anchor: Option<Instant>,

    finished: bool,
    released: bool,
}

impl SimulatedEngine {
    /// Create a paused engine at position 0
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            base_ms: 0,
            anchor: None,
            finished: false,
            released: false,
        }
    }

    /// Start playing; the infallible form of [`AudioEngine::play`]
    pub fn start(&mut self) {
        self.settle();
        if self.finished || self.released {
            return;
        }
        if self.anchor.is_none() {
            self.anchor = Some(Instant::now());
        }
    }

    fn position_at(&self, now: Instant) -> u64 {
        match self.anchor {
            Some(anchor) => {
                let steps = now.saturating_duration_since(anchor).as_millis() as u64 / STEP_MS;
                self.base_ms
                    .saturating_add(steps.saturating_mul(STEP_MS))
                    .min(self.duration_ms)
            }
            None => self.base_ms,
        }
    }

    /// Latch the end state once the position reaches the duration
    fn settle(&mut self) {
        if self.anchor.is_some() && self.position_at(Instant::now()) >= self.duration_ms {
            self.base_ms = self.duration_ms;
            self.anchor = None;
            self.finished = true;
            debug!(duration_ms = self.duration_ms, "Simulated playback finished");
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            Err(EngineError::Released)
        } else {
            Ok(())
        }
    }
}

impl AudioEngine for SimulatedEngine {
    fn play(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.start();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.settle();
        if self.anchor.is_some() {
            self.base_ms = self.position_at(Instant::now());
            self.anchor = None;
        }
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<u64> {
        self.ensure_live()?;
        self.settle();
        if self.finished {
            return Ok(self.base_ms);
        }

        self.base_ms = position_ms.min(self.duration_ms);
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
        Ok(self.base_ms)
    }

    fn status(&mut self) -> EngineStatus {
        self.settle();
        EngineStatus {
            position_ms: self.position_at(Instant::now()),
            duration_ms: self.duration_ms,
            is_playing: self.anchor.is_some() && !self.released,
            finished: self.finished,
        }
    }

    fn release(&mut self) {
        self.anchor = None;
        self.released = true;
    }
}
