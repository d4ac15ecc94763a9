use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::facts::{EntityConfig, EntityKey, repo_ref};
use clap::{Parser, Subcommand};
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print what is being compared
    Show(ConfigShowArgs),
    /// Change the settings of one compared entity
    Set(ConfigSetArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the config as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigSetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Entity to change
    #[arg(value_name = "ENTITY")]
    pub entity: EntityKey,

    /// Display name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Repository reference, as `owner/repo` or a repository URL (empty to unset)
    #[arg(long, value_name = "REPO")]
    pub repo: Option<String>,

    /// Package name (empty to unset)
    #[arg(long, value_name = "PACKAGE")]
    pub package: Option<String>,
}

pub async fn configure<H: Host>(host: &mut H, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommand::Show(show_args) => show_config(host, show_args).await,
        ConfigCommand::Set(set_args) => set_config(host, set_args).await,
    }
}

async fn show_config<H: Host>(host: &mut H, args: &ConfigShowArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common, false)?;
    let state = common.session.state().await;
    let mut out = common.host().output();

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&state.config)?)?;
        return Ok(());
    }

    for (key, entity) in state.config.entities.iter() {
        writeln!(out, "{key}")?;
        write_entity(&mut out, entity)?;
    }

    Ok(())
}

async fn set_config<H: Host>(host: &mut H, args: &ConfigSetArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common, false)?;

    let mut entity = common.session.state().await.config.get(args.entity).clone();
    if let Some(name) = &args.name {
        entity.name.clone_from(name);
    }
    if let Some(repo) = &args.repo {
        entity.github_repo = repo.trim().to_string();
    }
    if let Some(package) = &args.package {
        entity.npm_pkg = package.trim().to_string();
    }

    common.session.set_config(args.entity, entity.clone()).await?;

    {
        let mut out = common.host().output();
        writeln!(out, "Updated {}", args.entity)?;
        write_entity(&mut out, &entity)?;
    }

    if repo_ref::normalize(&entity.github_repo).is_none() && !entity.github_repo.is_empty() {
        writeln!(
            common.host().error(),
            "warning: '{}' is not a recognizable repository reference; code-host metrics will be skipped",
            entity.github_repo
        )?;
    }

    Ok(())
}

fn write_entity(out: &mut impl Write, entity: &EntityConfig) -> Result<()> {
    let repo = match repo_ref::normalize(&entity.github_repo) {
        Some(repo) if repo.to_string() == entity.github_repo => repo.to_string(),
        Some(repo) => format!("{repo} (from '{}')", entity.github_repo),
        None if entity.github_repo.is_empty() => "not configured".to_string(),
        None => format!("invalid ('{}')", entity.github_repo),
    };

    let package = if entity.npm_pkg.is_empty() { "not configured" } else { &entity.npm_pkg };

    writeln!(out, "  name       : {}", entity.name)?;
    writeln!(out, "  repository : {repo}")?;
    writeln!(out, "  package    : {package}")?;
    Ok(())
}
