//! Command-line interface for compare-pulse
//!
//! Each subcommand lives in its own module and follows the same shape: build a [`common::Common`]
//! from the shared arguments, which loads the settings file and opens a session over the store,
//! then drive the session and print the outcome through the [`Host`].
//!
//! ## Commands
//!
//! - **refresh**: Collect metrics for both entities, going through the cache, and print the
//!   comparison table (or the export document with `--json`)
//! - **show**: Print the cached metrics without touching the network
//! - **clear-cache**: Drop both entities' cached metrics
//! - **config**: Show or change what is being compared
//! - **export**: Write the comparison config and metrics to a JSON file
//! - **init**: Generate a default settings file

mod clear;
mod common;
mod config;
mod configure;
mod export;
mod host;
mod init;
mod progress_reporter;
mod refresh;
mod run;
mod show;

pub use clear::{ClearArgs, clear_cache};
pub use common::{ColorMode, CommonArgs, LogLevel};
pub use config::{CONFIG_FILE_NAME, Config};
pub use configure::{ConfigArgs, ConfigCommand, ConfigSetArgs, ConfigShowArgs, configure};
pub use export::{ExportArgs, export_data};
pub use host::{Host, TestHost};
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use refresh::{RefreshArgs, refresh_metrics};
pub use run::run;
pub use show::{ShowArgs, show_metrics};
