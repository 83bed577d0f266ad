//! Dashboard command implementation.

use anyhow::Result;
use chrono::Local;
use hdms_core::dashboard;

use crate::cli::{DeskContext, source_line};
use crate::format::{DashboardReport, dashboard_text, format_timestamp, print_json};

/// Execute the dashboard command.
///
/// # Errors
///
/// Returns an error if the source cannot be built or output fails.
pub fn execute(ctx: &DeskContext) -> Result<()> {
    let snapshot = ctx.load_snapshot()?;
    let view = dashboard::compute(&snapshot.tickets, ctx.now, &Local, &ctx.config.policy);

    if ctx.json {
        return print_json(&DashboardReport {
            source: (&snapshot).into(),
            dashboard: view,
        });
    }

    println!("Moderator dashboard as of {} UTC", format_timestamp(&ctx.now));
    println!("{}", source_line(&snapshot));
    println!();
    println!("{}", dashboard_text(&view));
    Ok(())
}
