use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::reports::{DEFAULT_EXPORT_FILE, generate_json};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Parser;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output file (default is `community-data.json`; `-` writes to standard output)
    #[arg(value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Refresh the metrics before exporting instead of using cached values only
    #[arg(long)]
    pub refresh: bool,
}

/// Write the comparison config and current metrics as a JSON document.
pub async fn export_data<H: Host>(host: &mut H, args: &ExportArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common, false)?;

    let state = if args.refresh {
        let _ = common.refresh().await?;
        common.session.state().await
    } else {
        let cached = common.session.cached(Utc::now()).await;
        let mut state = common.session.state().await;
        for (key, metrics) in cached.iter() {
            if let Some(metrics) = metrics {
                state.metrics.get_mut(key).clone_from(metrics);
            }
        }
        state
    };

    let mut json_output = String::new();
    generate_json(&state.config, &state.metrics, &mut json_output)?;

    let path = args.output.clone().unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_EXPORT_FILE));
    if path == "-" {
        write!(common.host().output(), "{json_output}")?;
        return Ok(());
    }

    fs::write(&path, json_output).into_app_err_with(|| format!("writing export to '{path}'"))?;
    writeln!(common.host().output(), "Exported community data to {path}")?;
    Ok(())
}
