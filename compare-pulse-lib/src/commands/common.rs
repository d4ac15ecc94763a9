//! Setup shared by all commands that touch the store.

use super::config::Config;
use super::progress_reporter::ProgressReporter;
use crate::Result;
use crate::facts::{Cache, Collector, EntityMap, EntityReport, Store, hosting, registry};
use crate::reports::generate_console;
use crate::session::{AppState, Session};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::{Args, ValueEnum};
use core::time::Duration;
use directories::BaseDirs;
use ohno::IntoAppError;
use std::io::Write;
use std::path::PathBuf;

/// Delay before the refresh spinner appears.
const PROGRESS_DELAY: Duration = Duration::from_millis(300);

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command that works with the store
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to the settings file (default is `pulse.toml` in the current directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding cached metrics and the comparison config
    #[arg(long, value_name = "PATH")]
    pub store_dir: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

pub struct Common<'a, H: super::Host> {
    pub session: Session,
    pub config: Config,
    host: &'a mut H,
    color: ColorMode,
    log_level: LogLevel,
}

impl<H: super::Host> core::fmt::Debug for Common<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Common")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl<'a, H: super::Host> Common<'a, H> {
    /// Set up logging, load the settings and open a session over the store.
    pub fn new(host: &'a mut H, args: &CommonArgs, ignore_cached: bool) -> Result<Self> {
        init_logging(args.log_level);

        let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;
        let store = Store::new(resolve_store_dir(args.store_dir.as_ref())?);
        let now = Utc::now();

        let hosting = hosting::Provider::new(args.github_token.as_deref(), &config.github_api_url, config.retry_policy(), now)?;
        let registry = registry::Provider::new(&config.npm_downloads_url, &config.npm_registry_url, config.retry_policy(), now)?;
        let cache = Cache::new(store, config.cache_ttl, now, ignore_cached);

        Ok(Self {
            session: Session::new(Collector::new(hosting, registry, cache)),
            config,
            host,
            color: args.color,
            log_level: args.log_level,
        })
    }

    pub fn host(&mut self) -> &mut H {
        self.host
    }

    /// Refresh both entities, showing a spinner on stderr while waiting.
    pub async fn refresh(&self) -> Result<EntityMap<EntityReport>> {
        let progress = (self.log_level == LogLevel::None)
            .then(|| ProgressReporter::start("Refreshing", "community metrics", PROGRESS_DELAY, self.use_colors_for_stderr()));

        let result = self.session.refresh(Utc::now()).await.wait().await;

        if let Some(progress) = progress {
            progress.finish();
        }

        result
    }

    /// Print the comparison table for `state` to the host's output.
    pub fn print_table(&mut self, state: &AppState, reports: Option<&EntityMap<EntityReport>>) -> Result<()> {
        let mut console_output = String::new();
        generate_console(state, reports, self.use_colors_for_stdout(), &mut console_output)?;
        write!(self.host.output(), "{console_output}")?;
        Ok(())
    }

    fn use_colors_for_stdout(&self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                use std::io::{IsTerminal, stdout};
                stdout().is_terminal()
            }
        }
    }

    fn use_colors_for_stderr(&self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                use std::io::{IsTerminal, stderr};
                stderr().is_terminal()
            }
        }
    }
}

/// The store directory: the one given, or a `compare-pulse/store` directory in the platform cache directory.
fn resolve_store_dir(store_dir: Option<&Utf8PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = store_dir {
        return Ok(dir.as_std_path().to_path_buf());
    }

    Ok(BaseDirs::new()
        .into_app_err("could not determine cache directory")?
        .cache_dir()
        .join("compare-pulse")
        .join("store"))
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // A logger may already be installed when several commands run in one process.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}
