//! Attention command implementation.

use anyhow::Result;
use hdms_core::dashboard;

use crate::cli::{DeskContext, ListArgs, source_line};
use crate::format::{ListReport, format_attention_line, print_json};

/// Execute the attention command.
///
/// # Errors
///
/// Returns an error if the source cannot be built or output fails.
pub fn execute(args: &ListArgs, ctx: &DeskContext) -> Result<()> {
    let snapshot = ctx.load_snapshot()?;
    let mut policy = ctx.config.policy.clone();
    if let Some(limit) = args.limit {
        policy.attention_limit = limit;
    }
    let items = dashboard::tickets_requiring_attention(&snapshot.tickets, ctx.now, &policy);

    if ctx.json {
        return print_json(&ListReport {
            source: (&snapshot).into(),
            items,
        });
    }

    println!("{}", source_line(&snapshot));
    if items.is_empty() {
        println!("Nothing requires attention.");
        return Ok(());
    }
    println!("Requires attention ({}):", items.len());
    for item in &items {
        println!("  {}", format_attention_line(item));
    }
    Ok(())
}
