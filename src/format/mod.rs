//! Output formatting for `hdms`.
//!
//! Human-readable text by default; `--json` prints the report types in
//! [`output`] to stdout with diagnostics on stderr.

mod output;
mod text;

pub use output::{DashboardReport, ListReport, SessionReport, SourceSummary};
pub use text::{
    dashboard_text, format_activity_line, format_alert_line, format_attention_line,
    format_distribution_line, format_hours, format_timestamp, format_workload_line, icons, pad,
    stats_lines, truncate,
};

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
