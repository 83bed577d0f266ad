//! Workload command implementation.

use anyhow::Result;
use hdms_core::dashboard;
use unicode_width::UnicodeWidthStr;

use crate::cli::{DeskContext, source_line};
use crate::format::{ListReport, format_workload_line, print_json};

/// Execute the workload command.
///
/// # Errors
///
/// Returns an error if the source cannot be built or output fails.
pub fn execute(ctx: &DeskContext) -> Result<()> {
    let snapshot = ctx.load_snapshot()?;
    let workload = dashboard::department_workload(&snapshot.tickets);

    if ctx.json {
        return print_json(&ListReport {
            source: (&snapshot).into(),
            items: workload,
        });
    }

    println!("{}", source_line(&snapshot));
    if workload.is_empty() {
        println!("No active tickets.");
        return Ok(());
    }
    let width = workload
        .iter()
        .map(|w| w.department.width())
        .max()
        .unwrap_or(0);
    println!("Department workload:");
    for entry in &workload {
        println!("  {}", format_workload_line(entry, width));
    }
    Ok(())
}
