//! Session coordinator
//!
//! The single entry point for changing or observing "what is playing". Any number of
//! views hold a clone of [`SessionCoordinator`], call its operations, and render the
//! [`SessionSnapshot`] published through a watch channel.
//!
//! # Generations
//!
//! Every `play` and `stop` bumps the generation stored in the snapshot. Engines, status
//! pumps and in-flight acquires are all tagged with the generation they were started
//! for, and anything tagged with an older generation is dropped instead of applied:
//! - status updates are checked against the snapshot inside the same watch update that
//!   would apply them
//! - a pending acquire races against a generation change and is abandoned on one
//! - the pump asks the session for its own generation's status and exits once that
//!   engine is gone

use crate::engine::{AudioBackend, EngineStatus};
use crate::error::EngineError;
use crate::events::PlaybackEvent;
use crate::library::Library;
use crate::session::{PlaybackSession, SessionStats};
use crate::types::{PlaybackConfig, PlaybackMode, PlaybackState, SessionSnapshot};
use elementa_core::{Item, ItemId};
use std::sync::{Arc, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// An engine status reading tagged with the generation it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Generation of the engine that produced the reading
    pub generation: u64,

    /// The reading
    pub status: EngineStatus,
}

/// Cheap-to-clone handle to the shared playback session
///
/// Must be created inside a tokio runtime. No operation returns an error: engine
/// failures become simulated playback and rejected seeks are logged.
///
/// # Example
///
/// ```rust
/// use elementa_core::{Item, ItemId};
/// use elementa_playback::{PlaybackConfig, PlaybackMode, SessionCoordinator, SilentBackend};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let coordinator = SessionCoordinator::new(Arc::new(SilentBackend), PlaybackConfig::default());
///
/// coordinator.play(Item::new(ItemId::new(1), "Hydrogen", "H")).await;
///
/// let snapshot = coordinator.snapshot();
/// assert_eq!(snapshot.mode, Some(PlaybackMode::Simulated));
/// assert_eq!(snapshot.duration_ms, 180_000);
///
/// coordinator.stop().await;
/// # }
/// ```
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    config: PlaybackConfig,

    /// Pumps hold only a `Weak` to this
    session: Arc<Mutex<PlaybackSession>>,

    /// Shared with the apply task
    state: Arc<watch::Sender<SessionSnapshot>>,

    events: broadcast::Sender<PlaybackEvent>,
    updates: mpsc::UnboundedSender<StatusUpdate>,
    library: std::sync::Mutex<Library>,
}

impl SessionCoordinator {
    /// Create a coordinator and start its status apply task
    pub fn new(backend: Arc<dyn AudioBackend>, config: PlaybackConfig) -> Self {
        let state = Arc::new(watch::channel(SessionSnapshot::default()).0);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (updates, update_rx) = mpsc::unbounded_channel();

        tokio::spawn(apply_updates(update_rx, Arc::clone(&state), events.clone()));

        let session = PlaybackSession::new(
            backend,
            config.acquire_timeout,
            config.simulated_duration_ms,
        );

        Self {
            inner: Arc::new(Inner {
                session: Arc::new(Mutex::new(session)),
                library: std::sync::Mutex::new(Library::new(config.history_size)),
                config,
                state,
                events,
                updates,
            }),
        }
    }

    /// Play an item from the start
    ///
    /// Releases whatever was playing, then acquires the item's audio. Without audio, or
    /// when the acquire fails or times out, the item plays in simulated mode. Playing the
    /// item that is already active restarts it.
    ///
    /// Returns once the item is playing or once a newer `play`/`stop` has taken over.
    pub async fn play(&self, item: Item) {
        let generation = self.begin(&item);

        let mut session = self.inner.session.lock().await;
        if self.current_generation() != generation {
            debug!(generation, item_id = %item.id, "Play superseded before start");
            return;
        }
        session.release();

        let (mode, status) = match item.audio.as_ref() {
            Some(reference) => {
                let outcome = tokio::select! {
                    result = session.acquire(reference) => Some(result),
                    () = superseded(self.inner.state.subscribe(), generation) => None,
                };

                let Some(result) = outcome else {
                    debug!(generation, item_id = %item.id, "Acquire abandoned for newer request");
                    return;
                };

                if self.current_generation() != generation {
                    if let Ok(engine) = result {
                        session.discard(engine);
                    }
                    debug!(generation, item_id = %item.id, "Acquire finished after supersede");
                    return;
                }

                let installed =
                    result.and_then(|engine| session.install(generation, PlaybackMode::Real, engine));
                match installed {
                    Ok(status) => (PlaybackMode::Real, status),
                    Err(e) => self.fall_back(&mut session, generation, &item, Some(e)),
                }
            }
            None => self.fall_back(&mut session, generation, &item, None),
        };

        let pump = tokio::spawn(run_status_pump(
            Arc::downgrade(&self.inner.session),
            generation,
            self.inner.config.status_interval,
            self.inner.updates.clone(),
        ));
        session.attach_pump(generation, pump);

        self.publish_started(generation, mode, status);
    }

    /// Flip between playing and paused
    ///
    /// Does nothing while an item is loading, when no engine is installed or when the
    /// item has finished.
    pub async fn toggle_playback(&self) {
        let Some(mut session) = self.lock_for_command().await else {
            debug!("Toggle while loading ignored");
            return;
        };
        let Some(generation) = self.installed_generation(&session) else {
            debug!("Toggle with no active engine ignored");
            return;
        };

        match session.toggle() {
            Ok(status) => {
                apply_update(
                    &self.inner.state,
                    &self.inner.events,
                    StatusUpdate { generation, status },
                );
            }
            Err(e) => warn!(error = %e, "Toggle failed"),
        }
    }

    /// Seek the active item
    ///
    /// Negative positions clamp to 0 and positions past the end clamp to the duration.
    /// If the engine rejects the seek the requested position is shown until the next
    /// status update. Ignored while an item is loading.
    pub async fn seek(&self, position_ms: i64) {
        let target = u64::try_from(position_ms).unwrap_or(0);

        let Some(mut session) = self.lock_for_command().await else {
            debug!(target, "Seek while loading ignored");
            return;
        };
        let Some(generation) = self.installed_generation(&session) else {
            debug!(target, "Seek with no active engine ignored");
            return;
        };

        match session.seek(target) {
            Ok(status) => {
                apply_update(
                    &self.inner.state,
                    &self.inner.events,
                    StatusUpdate { generation, status },
                );
            }
            Err(e) => {
                debug!(error = %e, target, "Seek rejected, showing requested position");
                self.inner.state.send_if_modified(|snapshot| {
                    if snapshot.generation != generation {
                        return false;
                    }
                    snapshot.position_ms = if snapshot.duration_ms > 0 {
                        target.min(snapshot.duration_ms)
                    } else {
                        target
                    };
                    true
                });
            }
        }
    }

    /// Seek to a fraction of the duration (progress bar)
    pub async fn seek_fraction(&self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let duration = self.snapshot().duration_ms;
        self.seek((duration as f64 * fraction).round() as i64).await;
    }

    /// Stop playback and clear the active item
    ///
    /// Favorites and history are kept. With nothing active this is a no-op.
    pub async fn stop(&self) {
        let mut previous = None;
        let mut stopped_generation = None;

        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.active_item.is_none() && snapshot.state == PlaybackState::Stopped {
                return false;
            }
            previous = snapshot.active_item_id();
            *snapshot = SessionSnapshot {
                generation: snapshot.generation + 1,
                ..SessionSnapshot::default()
            };
            stopped_generation = Some(snapshot.generation);
            true
        });

        let Some(generation) = stopped_generation else {
            debug!("Stop with nothing active");
            return;
        };

        info!(generation, previous = ?previous, "Playback stopped");
        self.emit(PlaybackEvent::ItemChanged {
            item_id: None,
            previous_item_id: previous,
        });
        self.emit(PlaybackEvent::StateChanged {
            state: PlaybackState::Stopped,
            mode: None,
        });

        // A play issued after this stop may already own the session
        self.inner
            .session
            .lock()
            .await
            .release_older_than(generation);
    }

    /// Show an item without starting playback
    ///
    /// Only the displayed item changes; whatever is playing keeps playing.
    pub fn set_active_item(&self, item: Option<Item>) {
        let item_id = item.as_ref().map(|i| i.id);
        let mut previous = None;

        let changed = self.inner.state.send_if_modified(|snapshot| {
            if snapshot.active_item == item {
                return false;
            }
            previous = snapshot.active_item_id();
            snapshot.active_item = item;
            true
        });

        if changed {
            self.emit(PlaybackEvent::ItemChanged {
                item_id,
                previous_item_id: previous,
            });
        }
    }

    /// Feed a status reading from an engine that pushes its own updates
    ///
    /// Readings whose generation is not current are dropped.
    pub fn report_status(&self, update: StatusUpdate) {
        if self.inner.updates.send(update).is_err() {
            debug!("Status apply task is gone");
        }
    }

    /// Flip favorite membership, returning whether the item is now a favorite
    pub fn toggle_favorite(&self, id: ItemId) -> bool {
        let is_favorite = self.lock_library().favorites.toggle(id);
        debug!(item_id = %id, is_favorite, "Favorite toggled");
        self.emit(PlaybackEvent::FavoriteToggled {
            item_id: id,
            is_favorite,
        });
        is_favorite
    }

    /// Whether an item is a favorite
    pub fn is_favorite(&self, id: ItemId) -> bool {
        self.lock_library().favorites.contains(id)
    }

    /// Favorites in the order they were added
    pub fn favorites(&self) -> Vec<ItemId> {
        self.lock_library().favorites.get_all()
    }

    /// Recently played items, most recent first
    pub fn history(&self) -> Vec<ItemId> {
        self.lock_library().history.get_all()
    }

    /// Forget the play history
    pub fn clear_history(&self) {
        self.lock_library().history.clear();
    }

    /// Copy of favorites and history
    pub fn library(&self) -> Library {
        self.lock_library().clone()
    }

    /// Receiver for snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver for playback events
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    /// Engine counters
    pub async fn stats(&self) -> SessionStats {
        self.inner.session.lock().await.stats()
    }

    /// Playback configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.inner.config
    }

    // ===== Internals =====

    fn current_generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    /// Lock the session for a transport command
    ///
    /// `None` while an item is loading, or when a newer `play`/`stop` starts while
    /// waiting for the lock. A loading `play` holds the lock until its acquire ends.
    async fn lock_for_command(&self) -> Option<tokio::sync::MutexGuard<'_, PlaybackSession>> {
        let (generation, loading) = {
            let snapshot = self.inner.state.borrow();
            (snapshot.generation, snapshot.state == PlaybackState::Loading)
        };
        if loading {
            return None;
        }

        tokio::select! {
            session = self.inner.session.lock() => Some(session),
            () = superseded(self.inner.state.subscribe(), generation) => None,
        }
    }

    /// Generation of the installed engine if it is current and not finished
    fn installed_generation(&self, session: &PlaybackSession) -> Option<u64> {
        let snapshot = self.inner.state.borrow();
        session
            .generation()
            .filter(|&g| g == snapshot.generation && !snapshot.finished)
    }

    /// Bump the generation and show the item as loading
    fn begin(&self, item: &Item) -> u64 {
        let mut generation = 0;
        let mut previous = None;

        self.inner.state.send_modify(|snapshot| {
            previous = snapshot.active_item_id();
            *snapshot = SessionSnapshot {
                generation: snapshot.generation + 1,
                active_item: Some(item.clone()),
                state: PlaybackState::Loading,
                ..SessionSnapshot::default()
            };
            generation = snapshot.generation;
        });

        self.lock_library().history.push(item.id);

        info!(generation, item_id = %item.id, name = %item.name, "Play requested");
        self.emit(PlaybackEvent::ItemChanged {
            item_id: Some(item.id),
            previous_item_id: previous,
        });
        self.emit(PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
            mode: None,
        });

        generation
    }

    fn fall_back(
        &self,
        session: &mut PlaybackSession,
        generation: u64,
        item: &Item,
        error: Option<EngineError>,
    ) -> (PlaybackMode, EngineStatus) {
        let reason = match error {
            Some(e) => {
                warn!(item_id = %item.id, error = %e, "Audio unavailable, simulating playback");
                e.to_string()
            }
            None => {
                debug!(item_id = %item.id, "Item has no audio, simulating playback");
                "item has no audio".to_string()
            }
        };

        let status = session.install_simulated(generation);
        self.emit(PlaybackEvent::SimulatedFallback {
            item_id: item.id,
            reason,
        });
        (PlaybackMode::Simulated, status)
    }

    fn publish_started(&self, generation: u64, mode: PlaybackMode, status: EngineStatus) {
        let state = if status.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };

        let published = self.inner.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = state;
            snapshot.mode = Some(mode);
            snapshot.position_ms = status.position_ms;
            snapshot.duration_ms = status.duration_ms;
            snapshot.finished = status.finished;
            true
        });

        if published {
            info!(generation, mode = %mode, duration_ms = status.duration_ms, "Playback started");
            self.emit(PlaybackEvent::StateChanged {
                state,
                mode: Some(mode),
            });
        }
    }

    fn lock_library(&self) -> MutexGuard<'_, Library> {
        self.inner
            .library
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PlaybackEvent) {
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("snapshot", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Resolves once the snapshot generation moves past `generation`
async fn superseded(mut state: watch::Receiver<SessionSnapshot>, generation: u64) {
    loop {
        if state.borrow_and_update().generation != generation {
            return;
        }
        if state.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Apply a status reading if its generation is current
///
/// Returns whether the snapshot changed.
fn apply_update(
    state: &watch::Sender<SessionSnapshot>,
    events: &broadcast::Sender<PlaybackEvent>,
    update: StatusUpdate,
) -> bool {
    let StatusUpdate { generation, status } = update;
    let mut emitted = Vec::new();

    let changed = state.send_if_modified(|snapshot| {
        // Loading: the engine has not been announced yet
        if snapshot.generation != generation || snapshot.state == PlaybackState::Loading {
            return false;
        }

        let next_state = if status.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };
        let state_changed = snapshot.state != next_state;
        let position_changed = snapshot.position_ms != status.position_ms
            || snapshot.duration_ms != status.duration_ms;
        let newly_finished = status.finished && !snapshot.finished;

        if !(state_changed || position_changed || newly_finished) {
            return false;
        }

        snapshot.state = next_state;
        snapshot.position_ms = status.position_ms;
        snapshot.duration_ms = status.duration_ms;
        snapshot.finished |= status.finished;

        if position_changed {
            emitted.push(PlaybackEvent::PositionUpdate {
                position_ms: status.position_ms,
                duration_ms: status.duration_ms,
            });
        }
        if state_changed {
            emitted.push(PlaybackEvent::StateChanged {
                state: next_state,
                mode: snapshot.mode,
            });
        }
        if newly_finished {
            if let Some(item_id) = snapshot.active_item_id() {
                emitted.push(PlaybackEvent::PlaybackFinished { item_id });
            }
        }
        true
    });

    for event in emitted {
        let _ = events.send(event);
    }
    changed
}

/// Single consumer of status readings
async fn apply_updates(
    mut updates: mpsc::UnboundedReceiver<StatusUpdate>,
    state: Arc<watch::Sender<SessionSnapshot>>,
    events: broadcast::Sender<PlaybackEvent>,
) {
    while let Some(update) = updates.recv().await {
        let current = state.borrow().generation;
        if update.generation != current {
            debug!(
                stale = update.generation,
                current, "Dropping status update from replaced engine"
            );
            continue;
        }
        apply_update(&state, &events, update);
    }
    debug!("Status apply task finished");
}

/// Polls the engine of one generation until it is released or finishes
async fn run_status_pump(
    session: Weak<Mutex<PlaybackSession>>,
    generation: u64,
    period: Duration,
    updates: mpsc::UnboundedSender<StatusUpdate>,
) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(session) = session.upgrade() else {
            break;
        };
        let status = session.lock().await.status_for(generation);
        drop(session);

        let Some(status) = status else {
            break;
        };
        if updates.send(StatusUpdate { generation, status }).is_err() || status.finished {
            break;
        }
    }

    debug!(generation, "Status pump stopped");
}
