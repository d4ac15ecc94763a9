//! Report generation for collected community metrics
//!
//! Two outputs are provided, each through a `generate` function:
//! - **Console**: an aligned comparison table with optional ANSI colors, followed by status lines
//!   for refresh errors, cache hits and failed reads
//! - **JSON**: the export document `{ "config": ..., "metrics": ... }`
//!
//! Row definitions and value formatting shared by the generators live in the `common` module.

mod common;
mod console;
mod json;

pub use console::generate as generate_console;
pub use json::{DEFAULT_EXPORT_FILE, ExportDocument, generate as generate_json};
