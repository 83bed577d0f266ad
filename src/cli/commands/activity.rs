//! Activity command implementation.

use anyhow::Result;
use hdms_core::activity;

use crate::cli::{DeskContext, ListArgs, source_line};
use crate::format::{ListReport, format_activity_line, print_json};

/// Execute the activity command.
///
/// # Errors
///
/// Returns an error if the source cannot be built or output fails.
pub fn execute(args: &ListArgs, ctx: &DeskContext) -> Result<()> {
    let snapshot = ctx.load_snapshot()?;
    let limit = args.limit.unwrap_or(ctx.config.policy.activity_limit);
    let entries = activity::recent_activity(&snapshot.tickets, ctx.now, limit);

    if ctx.json {
        return print_json(&ListReport {
            source: (&snapshot).into(),
            items: entries,
        });
    }

    println!("{}", source_line(&snapshot));
    if entries.is_empty() {
        println!("No recent activity.");
        return Ok(());
    }
    println!("Recent activity:");
    for entry in &entries {
        println!("  {}", format_activity_line(entry));
    }
    Ok(())
}
