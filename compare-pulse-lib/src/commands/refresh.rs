use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::reports::generate_json;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct RefreshArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Ignore cached metrics and fetch everything fresh
    #[arg(long)]
    pub ignore_cached: bool,

    /// Print the export document instead of the comparison table
    #[arg(long)]
    pub json: bool,

    /// Exit with status code 1 if any metric could not be fetched
    #[arg(long)]
    pub error_if_incomplete: bool,
}

/// Fetch metrics for both entities, going through the cache, and print them.
pub async fn refresh_metrics<H: Host>(host: &mut H, args: &RefreshArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common, args.ignore_cached)?;

    let result = common.refresh().await;
    let state = common.session.state().await;

    match result {
        Ok(reports) => {
            if args.json {
                let mut json_output = String::new();
                generate_json(&state.config, &state.metrics, &mut json_output)?;
                write!(common.host().output(), "{json_output}")?;
            } else {
                common.print_table(&state, Some(&reports))?;
            }

            let failed = reports.iter().map(|(_, report)| report.failures.len()).sum::<usize>();
            if args.error_if_incomplete && failed > 0 {
                writeln!(common.host().error(), "{failed} metric group(s) could not be fetched")?;
                common.host().exit(1);
            }

            Ok(())
        }
        Err(e) => {
            if !args.json {
                common.print_table(&state, None)?;
            }
            Err(e)
        }
    }
}
