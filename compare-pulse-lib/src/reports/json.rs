use crate::Result;
use crate::facts::{CommunityMetrics, ComparisonConfig, EntityMap};
use core::fmt::Write;
use serde::Serialize;

/// Default file name of an export.
pub const DEFAULT_EXPORT_FILE: &str = "community-data.json";

/// What an export contains: the comparison config and the metrics shown for it.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub config: &'a ComparisonConfig,
    pub metrics: &'a EntityMap<CommunityMetrics>,
}

pub fn generate<W: Write>(config: &ComparisonConfig, metrics: &EntityMap<CommunityMetrics>, writer: &mut W) -> Result<()> {
    let document = ExportDocument { config, metrics };
    writeln!(writer, "{}", serde_json::to_string_pretty(&document)?)?;
    Ok(())
}
