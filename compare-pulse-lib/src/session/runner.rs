use super::sequencer::{RequestId, RequestSequencer};
use super::state::{Action, AppState, reduce};
use crate::Result;
use crate::facts::{Collector, CommunityMetrics, ComparisonConfig, EntityConfig, EntityKey, EntityMap, EntityReport};
use chrono::{DateTime, Utc};
use ohno::app_err;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};

const LOG_TARGET: &str = "   session";

type SharedState = Arc<Mutex<AppState>>;

/// Owns the application state and runs refreshes against a [`Collector`].
#[derive(Debug)]
pub struct Session {
    collector: Arc<Collector>,
    sequencer: RequestSequencer,
    state: SharedState,
    latest: Mutex<Option<AbortHandle>>,
}

/// A refresh running in the background.
///
/// The state is updated when the refresh completes whether or not the handle is awaited.
#[derive(Debug)]
pub struct RefreshHandle {
    request: RequestId,
    abort: AbortHandle,
    completion: JoinHandle<core::result::Result<EntityMap<EntityReport>, String>>,
}

impl RefreshHandle {
    #[must_use]
    pub const fn request(&self) -> RequestId {
        self.request
    }

    /// Cancel the refresh. The session records it as failed.
    pub fn abort(&self) {
        self.abort.abort();
    }

    /// Wait for the refresh to complete and return what it collected.
    pub async fn wait(self) -> Result<EntityMap<EntityReport>> {
        match self.completion.await {
            Ok(Ok(reports)) => Ok(reports),
            Ok(Err(message)) => Err(app_err!("{message}")),
            Err(e) => Err(app_err!("refresh {} did not complete: {e}", self.request)),
        }
    }
}

impl Session {
    /// Start a session, restoring the comparison config saved in the collector's store.
    #[must_use]
    pub fn new(collector: Collector) -> Self {
        let config = ComparisonConfig::load(collector.cache().store());
        Self {
            collector: Arc::new(collector),
            sequencer: RequestSequencer::new(),
            state: Arc::new(Mutex::new(AppState::new(config))),
            latest: Mutex::new(None),
        }
    }

    /// A snapshot of the current state.
    pub async fn state(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn dispatch(&self, action: Action) {
        apply(&self.state, action).await;
    }

    /// Start refreshing both entities' metrics.
    pub async fn refresh(&self, now: DateTime<Utc>) -> RefreshHandle {
        let request = self.sequencer.next_id();

        let config = apply_then(&self.state, Action::RefreshStarted { request }, |s| s.config.clone()).await;

        log::debug!(target: LOG_TARGET, "Starting refresh {request}");

        let collector = Arc::clone(&self.collector);
        let task = tokio::spawn(async move { collector.collect(now, &config).await });
        let abort = task.abort_handle();
        *self.latest.lock().await = Some(task.abort_handle());

        let state = Arc::clone(&self.state);
        let completion = tokio::spawn(async move {
            let outcome = match task.await {
                Ok(Ok(reports)) => Ok(reports),
                Ok(Err(e)) => Err(format!("{e:#}")),
                Err(e) if e.is_cancelled() => Err(format!("refresh {request} was cancelled")),
                Err(e) => Err(format!("refresh {request} failed: {e}")),
            };

            let action = match &outcome {
                Ok(reports) => Action::RefreshSucceeded {
                    request,
                    metrics: reports.clone().map(|_, report| report.metrics),
                },
                Err(message) => {
                    log::warn!(target: LOG_TARGET, "{message}");
                    Action::RefreshFailed {
                        request,
                        message: message.clone(),
                    }
                }
            };

            apply(&state, action).await;
            outcome
        });

        RefreshHandle {
            request,
            abort,
            completion,
        }
    }

    /// Cached metrics of both entities for the current config, without any network request.
    pub async fn cached(&self, now: DateTime<Utc>) -> EntityMap<Option<CommunityMetrics>> {
        let config = self.state.lock().await.config.clone();
        self.collector.cached(now, &config)
    }

    /// Drop the cached metrics of both entities and reset the displayed metrics.
    ///
    /// A refresh still running is cancelled first. The state is reset even when removing a
    /// cache entry fails.
    pub async fn clear_cache(&self) -> Result<()> {
        if let Some(running) = self.latest.lock().await.take() {
            running.abort();
        }

        let config = self.state.lock().await.config.clone();
        let result = self.collector.clear(&config);
        self.dispatch(Action::CacheCleared).await;
        result
    }

    /// Replace one entity's settings and persist the comparison config.
    pub async fn set_config(&self, entity: EntityKey, config: EntityConfig) -> Result<()> {
        let updated = apply_then(&self.state, Action::ConfigChanged { entity, config }, |s| s.config.clone()).await;

        updated.save(self.collector.cache().store())
    }
}

async fn apply(state: &Mutex<AppState>, action: Action) {
    apply_then(state, action, |_| ()).await;
}

/// Reduce `action` into `state` and read from the result while still holding the lock.
async fn apply_then<R>(state: &Mutex<AppState>, action: Action, read: impl FnOnce(&AppState) -> R) -> R {
    let mut guard = state.lock().await;
    let current = core::mem::take(&mut *guard);
    *guard = reduce(current, action);
    read(&guard)
}
