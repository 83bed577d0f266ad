//! SLA breach and approaching-breach evaluation.
//!
//! A ticket is measured from its submission time against a fixed window.
//! Terminal tickets are never evaluated. Alerts are recomputed from the wall
//! clock on every pass and never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::config::DeskConfig;
use crate::model::Ticket;

/// At or below this share of the window left, a ticket is "approaching" breach.
pub const APPROACHING_PERCENT: f64 = 25.0;

/// A ticket that has breached, or is about to breach, its SLA window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaAlert<'a> {
    pub ticket: &'a Ticket,
    /// Hours left in the window; set only when approaching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<f64>,
    /// Hours past the window; set only when breached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_overdue: Option<f64>,
    pub is_breached: bool,
    pub is_approaching: bool,
}

/// Evaluate one ticket against the SLA window.
///
/// Returns `None` for terminal tickets and for tickets comfortably inside
/// the window.
#[must_use]
pub fn evaluate<'a>(
    ticket: &'a Ticket,
    now: DateTime<Utc>,
    window_hours: f64,
) -> Option<SlaAlert<'a>> {
    if ticket.status.is_terminal() {
        return None;
    }

    let elapsed = ticket.hours_since_submission(now);
    let remaining = window_hours - elapsed;
    let percent_remaining = remaining / window_hours * 100.0;

    let is_breached = elapsed > window_hours;
    let is_approaching = !is_breached && percent_remaining <= APPROACHING_PERCENT;

    if !is_breached && !is_approaching {
        return None;
    }

    Some(SlaAlert {
        ticket,
        time_remaining: (!is_breached).then_some(remaining),
        time_overdue: is_breached.then_some(elapsed - window_hours),
        is_breached,
        is_approaching,
    })
}

/// All SLA alerts for a snapshot, most urgent presentation order first.
///
/// Breached alerts come before approaching ones; breached alerts are ordered
/// by ascending overdue time. Approaching alerts keep input order. The list
/// is capped at `config.alert_limit`.
#[must_use]
pub fn sla_alerts<'a>(
    tickets: &'a [Ticket],
    now: DateTime<Utc>,
    config: &DeskConfig,
) -> Vec<SlaAlert<'a>> {
    let mut alerts: Vec<SlaAlert<'a>> = tickets
        .iter()
        .filter_map(|ticket| evaluate(ticket, now, config.sla_window_hours))
        .collect();

    alerts.sort_by(compare_alerts);
    alerts.truncate(config.alert_limit);

    tracing::debug!(count = alerts.len(), "Computed SLA alerts");
    alerts
}

fn compare_alerts(a: &SlaAlert<'_>, b: &SlaAlert<'_>) -> Ordering {
    b.is_breached.cmp(&a.is_breached).then_with(|| {
        let a_overdue = a.time_overdue.unwrap_or(0.0);
        let b_overdue = b.time_overdue.unwrap_or(0.0);
        a_overdue.total_cmp(&b_overdue)
    })
}
