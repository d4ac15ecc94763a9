use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::facts::EntityKey;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ClearArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Remove both entities' cached metrics.
pub async fn clear_cache<H: Host>(host: &mut H, args: &ClearArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common, false)?;
    common.session.clear_cache().await?;

    let state = common.session.state().await;
    writeln!(
        common.host().output(),
        "Cleared cached metrics for {} and {}",
        state.config.get(EntityKey::OpenSpec).name,
        state.config.get(EntityKey::SpecKit).name
    )?;

    Ok(())
}
