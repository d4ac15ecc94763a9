use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use chrono::Utc;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Print the cached metrics without making any network request.
pub async fn show_metrics<H: Host>(host: &mut H, args: &ShowArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common, false)?;

    let cached = common.session.cached(Utc::now()).await;
    let mut state = common.session.state().await;

    let mut missing = Vec::new();
    for (key, metrics) in cached.iter() {
        match metrics {
            Some(metrics) => state.metrics.get_mut(key).clone_from(metrics),
            None => missing.push(state.config.get(key).name.clone()),
        }
    }

    common.print_table(&state, None)?;

    if !missing.is_empty() {
        writeln!(
            common.host().error(),
            "\nNo cached metrics for {}; run `compare-pulse refresh` to fetch them",
            missing.join(" and ")
        )?;
    }

    Ok(())
}
