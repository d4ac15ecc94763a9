//! Command dispatch logic for compare-pulse

use super::{
    ClearArgs, ConfigArgs, ExportArgs, InitArgs, RefreshArgs, ShowArgs, clear_cache, configure, export_data, init_config,
    refresh_metrics, show_metrics,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "compare-pulse", version, author, long_about = None)]
#[command(about = "Compare the community pulse of OpenSpec and SpecKit")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: PulseSubcommand,
}

#[derive(Subcommand, Debug)]
enum PulseSubcommand {
    /// Collect metrics for both entities and print the comparison
    Refresh(Box<RefreshArgs>),
    /// Print the cached metrics without making any network request
    Show(Box<ShowArgs>),
    /// Remove both entities' cached metrics
    ClearCache(Box<ClearArgs>),
    /// Show or change what is being compared
    Config(Box<ConfigArgs>),
    /// Export the comparison as JSON
    Export(Box<ExportArgs>),
    /// Generate a default settings file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        PulseSubcommand::Refresh(refresh_args) => refresh_metrics(host, refresh_args).await,
        PulseSubcommand::Show(show_args) => show_metrics(host, show_args).await,
        PulseSubcommand::ClearCache(clear_args) => clear_cache(host, clear_args).await,
        PulseSubcommand::Config(config_args) => configure(host, config_args).await,
        PulseSubcommand::Export(export_args) => export_data(host, export_args).await,
        PulseSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
