//! Single-flight model loader.
//!
//! Owns the session lifecycle as a small state machine:
//! `Unloaded -> Loading -> Loaded | Failed`. Callers arriving while a load
//! is in flight attach to that load instead of starting another one.
//! A failed attempt is not cached; the next call starts over.

use crate::error::InferenceError;
use crate::models::session::{ModelSession, SessionFactory};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

type LoadOutcome = Result<Arc<dyn ModelSession>, InferenceError>;

enum LoadState {
    Unloaded,
    /// Receivers resolve to `Some` once the in-flight load completes.
    Loading(watch::Receiver<Option<LoadOutcome>>),
    Loaded(Arc<dyn ModelSession>),
    Failed(InferenceError),
}

struct Shared {
    state: LoadState,
    /// Bumped by `reset` so a stale load cannot overwrite newer state.
    generation: u64,
}

/// Observable loader state
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Unloaded,
    Loading,
    Loaded,
    Failed(InferenceError),
}

/// Lazily creates and then shares one session.
pub struct ModelLoader<F: SessionFactory> {
    factory: Arc<F>,
    shared: Arc<Mutex<Shared>>,
    load_timeout: Option<Duration>,
}

impl<F: SessionFactory> ModelLoader<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
            shared: Arc::new(Mutex::new(Shared {
                state: LoadState::Unloaded,
                generation: 0,
            })),
            load_timeout: None,
        }
    }

    /// Bound each load attempt. `None` waits indefinitely.
    pub fn with_timeout(mut self, load_timeout: Option<Duration>) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    pub fn status(&self) -> LoadStatus {
        match &lock(&self.shared).state {
            LoadState::Unloaded => LoadStatus::Unloaded,
            LoadState::Loading(_) => LoadStatus::Loading,
            LoadState::Loaded(_) => LoadStatus::Loaded,
            LoadState::Failed(e) => LoadStatus::Failed(e.clone()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == LoadStatus::Loaded
    }

    /// Return the session, loading it first if needed.
    ///
    /// Concurrent callers converge on a single load. The load itself runs
    /// on a detached task, so dropping this future does not strand other
    /// waiters.
    pub async fn ensure_loaded(&self) -> LoadOutcome {
        let mut rx = {
            let mut shared = lock(&self.shared);
            let pending = match &shared.state {
                LoadState::Loaded(session) => return Ok(Arc::clone(session)),
                // A closed channel that never resolved means the load task
                // was dropped (e.g. its runtime shut down); start over.
                LoadState::Loading(rx) if rx.has_changed().is_err() && rx.borrow().is_none() => {
                    None
                }
                LoadState::Loading(rx) => Some(rx.clone()),
                LoadState::Unloaded | LoadState::Failed(_) => None,
            };
            match pending {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = watch::channel(None);
                    shared.state = LoadState::Loading(rx.clone());
                    self.spawn_load(tx, shared.generation);
                    rx
                }
            }
        };

        let outcome = match rx.wait_for(|outcome| outcome.is_some()).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };

        match outcome {
            Some(result) => result,
            None => {
                self.abandon(&rx);
                Err(InferenceError::SessionUnavailable)
            }
        }
    }

    /// Clear a `Loading` state whose task went away without a result.
    fn abandon(&self, rx: &watch::Receiver<Option<LoadOutcome>>) {
        let mut shared = lock(&self.shared);
        let stale = matches!(&shared.state, LoadState::Loading(current) if current.same_channel(rx));
        if stale {
            shared.state = LoadState::Unloaded;
            warn!("Model load task ended without a result");
        }
    }

    /// Drop the current session; the next call loads again.
    pub fn reset(&self) {
        let mut shared = lock(&self.shared);
        shared.generation += 1;
        shared.state = LoadState::Unloaded;
        info!(generation = shared.generation, "Model session reset");
    }

    fn spawn_load(&self, tx: watch::Sender<Option<LoadOutcome>>, generation: u64) {
        let factory = Arc::clone(&self.factory);
        let shared = Arc::clone(&self.shared);
        let load_timeout = self.load_timeout;

        info!(generation, "Starting model load");

        tokio::spawn(async move {
            let started = Instant::now();
            let load = tokio::task::spawn_blocking(move || factory.create_session());

            let joined = match load_timeout {
                Some(limit) => match tokio::time::timeout(limit, load).await {
                    Ok(joined) => joined,
                    Err(_) => Ok(Err(InferenceError::Timeout {
                        stage: "load",
                        after_ms: limit.as_millis() as u64,
                    })),
                },
                None => load.await,
            };
            let outcome = joined.unwrap_or_else(|e| {
                Err(InferenceError::ModelLoad(format!("load task failed: {}", e)))
            });

            match &outcome {
                Ok(session) => info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    inputs = ?session.input_names(),
                    outputs = ?session.output_names(),
                    "Model loaded successfully"
                ),
                Err(e) => warn!(error = %e, "Model load failed"),
            }

            {
                let mut guard = lock(&shared);
                if guard.generation == generation {
                    guard.state = match &outcome {
                        Ok(session) => LoadState::Loaded(Arc::clone(session)),
                        Err(e) => LoadState::Failed(e.clone()),
                    };
                }
            }

            // No receivers left is fine; state already holds the result.
            let _ = tx.send(Some(outcome));
        });
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
