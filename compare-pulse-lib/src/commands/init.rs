use super::Host;
use super::config::{CONFIG_FILE_NAME, Config};
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output settings file path (default is `pulse.toml` in the current directory)
    #[arg(value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME));

    Config::save_default(&output)?;
    writeln!(host.output(), "Generated default settings file: {output}")?;
    Ok(())
}
