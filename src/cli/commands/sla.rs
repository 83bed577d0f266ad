//! SLA command implementation.

use anyhow::Result;
use hdms_core::sla;

use crate::cli::{DeskContext, ListArgs, source_line};
use crate::format::{ListReport, format_alert_line, print_json};

/// Execute the sla command.
///
/// # Errors
///
/// Returns an error if the source cannot be built or output fails.
pub fn execute(args: &ListArgs, ctx: &DeskContext) -> Result<()> {
    let snapshot = ctx.load_snapshot()?;
    let mut policy = ctx.config.policy.clone();
    if let Some(limit) = args.limit {
        policy.alert_limit = limit;
    }
    let alerts = sla::sla_alerts(&snapshot.tickets, ctx.now, &policy);

    if ctx.json {
        return print_json(&ListReport {
            source: (&snapshot).into(),
            items: alerts,
        });
    }

    println!("{}", source_line(&snapshot));
    if alerts.is_empty() {
        println!("No SLA alerts (window: {}h).", policy.sla_window_hours);
        return Ok(());
    }
    let breached = alerts.iter().filter(|a| a.is_breached).count();
    println!(
        "SLA alerts ({breached} breached, {} approaching, window {}h):",
        alerts.len() - breached,
        policy.sla_window_hours
    );
    for alert in &alerts {
        println!("  {}", format_alert_line(alert));
    }
    Ok(())
}
