//! Community metrics collection for the compared projects
//!
//! This module gathers public metrics about the two projects being compared from a code host
//! (stars, forks, watchers, releases, open issues, recent commit activity) and from a package
//! registry (weekly downloads, latest version, maintainers).
//!
//! # Implementation Model
//!
//! - [`repo_ref`] turns free-form repository references into a canonical [`RepoRef`].
//! - [`hosting`] and [`registry`] issue their reads concurrently. Each read produces a
//!   [`FetchResult`], so one failed read never hides the others.
//! - [`Cache`] keeps the merged [`CommunityMetrics`] of each entity in a [`Store`] for a
//!   bounded time.
//! - The [`Collector`] ties these together for both entities at once.

mod cache;
mod collector;
mod community_metrics;
mod comparison;
mod entity;
mod fetch_error;
pub mod hosting;
mod metric_group;
mod path_utils;
pub mod registry;
pub mod repo_ref;
pub(crate) mod resilient_http;
mod store;

pub use cache::{Cache, DEFAULT_CACHE_TTL, Envelope};
pub use collector::{Collector, EntityReport, Source, cache_key};
pub use community_metrics::CommunityMetrics;
pub use comparison::{CONFIG_KEY, ComparisonConfig, EntityConfig};
pub use entity::{EntityKey, EntityMap};
pub use fetch_error::{FetchError, FetchResult, RateLimitInfo};
pub use metric_group::MetricGroup;
pub use repo_ref::RepoRef;
pub use resilient_http::{DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT, RetryPolicy};
pub use store::Store;
