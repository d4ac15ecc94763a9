#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for compare-pulse
//!
//! This library consolidates all functionality for the compare-pulse tool, which
//! gathers community metrics (stars, forks, releases, commit activity, package
//! downloads) for two projects being compared side by side.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`facts`]: Reference normalization, metric fetching, caching and aggregation
//! - [`session`]: Application state, the reducer that updates it, and refresh sequencing
//! - [`reports`]: Console and JSON export output

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

/// User agent sent with every outgoing request.
pub const USER_AGENT: &str = "compare-pulse";

pub mod commands;
pub mod facts;
pub mod reports;
pub mod session;

pub use crate::commands::{Host, run};
