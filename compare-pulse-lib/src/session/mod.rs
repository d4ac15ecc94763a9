//! Application state and refresh orchestration
//!
//! [`AppState`] is only ever changed by [`reduce`], a pure function of the previous state and an
//! [`Action`]. A [`Session`] owns the state together with a [`Collector`](crate::facts::Collector)
//! and runs refreshes as cancellable background tasks. Every refresh is tagged with a
//! [`RequestId`] so that a result arriving after a newer refresh has started is dropped.

mod runner;
mod sequencer;
mod state;

pub use runner::{RefreshHandle, Session};
pub use sequencer::{RequestId, RequestSequencer};
pub use state::{Action, AppState, Status, reduce};
