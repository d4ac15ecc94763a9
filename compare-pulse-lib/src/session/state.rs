use super::sequencer::RequestId;
use crate::facts::{CommunityMetrics, ComparisonConfig, EntityConfig, EntityKey, EntityMap};
use strum::Display;

const LOG_TARGET: &str = "     state";

/// Progress of the most recent refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Everything the user sees: what is compared, the latest metrics, and how the last refresh went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub config: ComparisonConfig,
    pub metrics: EntityMap<CommunityMetrics>,
    pub status: Status,
    pub error: Option<String>,

    /// The refresh whose result will be accepted, if any.
    pub in_flight: Option<RequestId>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ComparisonConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading)
    }
}

/// A change to [`AppState`].
#[derive(Debug, Clone)]
pub enum Action {
    RefreshStarted { request: RequestId },
    RefreshSucceeded { request: RequestId, metrics: EntityMap<CommunityMetrics> },
    RefreshFailed { request: RequestId, message: String },
    CacheCleared,
    ConfigChanged { entity: EntityKey, config: EntityConfig },
    ErrorDismissed,
}

/// Compute the state that follows `state` once `action` is applied.
///
/// Refresh results are only accepted from the request currently in flight; anything else is a
/// stale result and leaves the state untouched. A failed refresh keeps the previous metrics.
#[must_use]
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::RefreshStarted { request } => AppState {
            status: Status::Loading,
            error: None,
            in_flight: Some(request),
            ..state
        },

        Action::RefreshSucceeded { request, metrics } if state.in_flight == Some(request) => AppState {
            metrics,
            status: Status::Success,
            in_flight: None,
            ..state
        },

        Action::RefreshFailed { request, message } if state.in_flight == Some(request) => AppState {
            status: Status::Error,
            error: Some(message),
            in_flight: None,
            ..state
        },

        Action::RefreshSucceeded { request, .. } | Action::RefreshFailed { request, .. } => {
            log::debug!(target: LOG_TARGET, "Discarding stale result of refresh {request}");
            state
        }

        Action::CacheCleared => AppState {
            metrics: EntityMap::default(),
            status: Status::Idle,
            in_flight: None,
            ..state
        },

        Action::ConfigChanged { entity, config } => {
            let mut state = state;
            *state.config.get_mut(entity) = config;
            state
        }

        Action::ErrorDismissed => AppState { error: None, ..state },
    }
}
