//! Moderator dashboard aggregation.
//!
//! Every function here is a pure function of a ticket snapshot and the
//! current instant: recomputing with the same inputs yields the same output
//! and the tickets are only borrowed.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::activity::{self, ActivityEntry};
use crate::config::DeskConfig;
use crate::model::{Priority, Status, Ticket};
use crate::sla::{self, SlaAlert};
use crate::util::{is_same_day, whole_days};

/// Departments above this many active tickets are at medium load.
pub const MEDIUM_LOAD_THRESHOLD: usize = 8;
/// Departments above this many active tickets are at high load.
pub const HIGH_LOAD_THRESHOLD: usize = 15;
/// Pending tickets idle longer than this are flagged with high priority.
pub const STALE_PENDING_HOURS: f64 = 48.0;

// ============================================================================
// Output Types
// ============================================================================

/// Headline counters for the moderator dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub pending_review: usize,
    pub total_active_tickets: usize,
    pub tickets_assigned_today: usize,
    /// Mean submission-to-resolution time, in whole hours.
    pub average_resolution_time: f64,
    pub sla_breaches: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Low,
    Medium,
    High,
}

impl LoadLevel {
    #[must_use]
    pub const fn for_count(count: usize) -> Self {
        if count > HIGH_LOAD_THRESHOLD {
            Self::High
        } else if count > MEDIUM_LOAD_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Active ticket count for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentWorkload {
    pub department: String,
    pub active_tickets: usize,
    pub load_level: LoadLevel,
}

/// Urgency of an attention item, independent of the ticket's own priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionPriority {
    Low,
    Medium,
    High,
}

impl AttentionPriority {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A ticket a moderator should look at, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionItem<'a> {
    pub ticket: &'a Ticket,
    pub reason: String,
    pub priority: AttentionPriority,
}

/// One slice of a priority or status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
}

/// Everything the moderator dashboard renders, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub stats: DashboardStats,
    pub department_workload: Vec<DepartmentWorkload>,
    pub tickets_requiring_attention: Vec<AttentionItem<'a>>,
    pub sla_alerts: Vec<SlaAlert<'a>>,
    pub recent_activity: Vec<ActivityEntry<'a>>,
    pub priority_distribution: Vec<DistributionEntry>,
    pub status_distribution: Vec<DistributionEntry>,
}

// ============================================================================
// Aggregation
// ============================================================================

/// Compute the full dashboard for `tickets` as of `now`.
///
/// `tz` decides where "today" starts and ends for the assigned-today count.
#[must_use]
pub fn compute<'a, Tz: TimeZone>(
    tickets: &'a [Ticket],
    now: DateTime<Utc>,
    tz: &Tz,
    config: &DeskConfig,
) -> DashboardSnapshot<'a> {
    let snapshot = DashboardSnapshot {
        generated_at: now,
        stats: dashboard_stats(tickets, now, tz, config),
        department_workload: department_workload(tickets),
        tickets_requiring_attention: tickets_requiring_attention(tickets, now, config),
        sla_alerts: sla::sla_alerts(tickets, now, config),
        recent_activity: activity::recent_activity(tickets, now, config.activity_limit),
        priority_distribution: priority_distribution(tickets),
        status_distribution: status_distribution(tickets),
    };

    tracing::debug!(
        tickets = tickets.len(),
        active = snapshot.stats.total_active_tickets,
        breaches = snapshot.stats.sla_breaches,
        "Computed dashboard snapshot"
    );
    snapshot
}

/// Headline counters.
#[must_use]
pub fn dashboard_stats<Tz: TimeZone>(
    tickets: &[Ticket],
    now: DateTime<Utc>,
    tz: &Tz,
    config: &DeskConfig,
) -> DashboardStats {
    let pending_review = tickets
        .iter()
        .filter(|t| is_stale_pending(t, now, config))
        .count();

    let total_active_tickets = tickets.iter().filter(|t| !t.status.is_terminal()).count();

    let tickets_assigned_today = tickets
        .iter()
        .filter_map(|t| t.assigned_date)
        .filter(|assigned| is_same_day(*assigned, now, tz))
        .count();

    let sla_breaches = tickets
        .iter()
        .filter(|t| is_breached(t, now, config))
        .count();

    DashboardStats {
        pending_review,
        total_active_tickets,
        tickets_assigned_today,
        average_resolution_time: average_resolution_hours(tickets).round(),
        sla_breaches,
    }
}

/// Mean submission-to-resolution time in hours; 0 when nothing is resolved.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_resolution_hours(tickets: &[Ticket]) -> f64 {
    let (sum, count) = tickets
        .iter()
        .filter_map(Ticket::resolution_hours)
        .fold((0.0_f64, 0_usize), |(sum, count), hours| {
            (sum + hours, count + 1)
        });

    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Active tickets per department, busiest first.
///
/// Departments with equal counts keep the order they first appear in.
#[must_use]
pub fn department_workload(tickets: &[Ticket]) -> Vec<DepartmentWorkload> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for ticket in tickets.iter().filter(|t| !t.status.is_terminal()) {
        let dept = ticket.department.as_str();
        if let Some(&slot) = index.get(dept) {
            order[slot].1 += 1;
        } else {
            index.insert(dept, order.len());
            order.push((dept, 1));
        }
    }

    let mut workload: Vec<DepartmentWorkload> = order
        .into_iter()
        .map(|(department, count)| DepartmentWorkload {
            department: department.to_string(),
            active_tickets: count,
            load_level: LoadLevel::for_count(count),
        })
        .collect();

    workload.sort_by(|a, b| b.active_tickets.cmp(&a.active_tickets));
    workload
}

/// Tickets a moderator should act on, most urgent first.
///
/// Two rules contribute, evaluated per ticket in order:
/// 1. pending/submitted and idle past the review threshold;
/// 2. non-terminal and past the SLA window, unless the ticket id was
///    already flagged.
///
/// Only rule 2 checks for an existing entry. The list is stably sorted by
/// priority and capped at `config.attention_limit`.
#[must_use]
pub fn tickets_requiring_attention<'a>(
    tickets: &'a [Ticket],
    now: DateTime<Utc>,
    config: &DeskConfig,
) -> Vec<AttentionItem<'a>> {
    let mut items: Vec<AttentionItem<'a>> = Vec::new();
    let mut flagged: HashSet<&str> = HashSet::new();

    for ticket in tickets {
        let hours = ticket.hours_since_submission(now);

        if ticket.status.is_pending_review() && hours > config.pending_review_hours {
            items.push(AttentionItem {
                ticket,
                reason: format!("Pending review for {} days", whole_days(hours)),
                priority: if hours > STALE_PENDING_HOURS {
                    AttentionPriority::High
                } else {
                    AttentionPriority::Medium
                },
            });
            flagged.insert(ticket.id.as_str());
        }

        if !ticket.status.is_terminal()
            && hours > config.sla_window_hours
            && !flagged.contains(ticket.id.as_str())
        {
            items.push(AttentionItem {
                ticket,
                reason: format!(
                    "SLA breached by {} days",
                    whole_days(hours - config.sla_window_hours)
                ),
                priority: AttentionPriority::High,
            });
            flagged.insert(ticket.id.as_str());
        }
    }

    items.sort_by(|a, b| b.priority.cmp(&a.priority));
    items.truncate(config.attention_limit);
    items
}

/// Ticket counts per priority, highest priority first, empty buckets omitted.
#[must_use]
pub fn priority_distribution(tickets: &[Ticket]) -> Vec<DistributionEntry> {
    Priority::DESCENDING
        .iter()
        .map(|priority| DistributionEntry {
            key: priority.as_str(),
            label: priority.label(),
            count: tickets.iter().filter(|t| t.priority == *priority).count(),
        })
        .filter(|entry| entry.count > 0)
        .collect()
}

/// Ticket counts per status, in the order statuses first appear.
#[must_use]
pub fn status_distribution(tickets: &[Ticket]) -> Vec<DistributionEntry> {
    let mut entries: Vec<(Status, usize)> = Vec::new();
    for ticket in tickets {
        match entries.iter_mut().find(|(status, _)| *status == ticket.status) {
            Some((_, count)) => *count += 1,
            None => entries.push((ticket.status, 1)),
        }
    }

    entries
        .into_iter()
        .map(|(status, count)| DistributionEntry {
            key: status.as_str(),
            label: status.label(),
            count,
        })
        .collect()
}

fn is_stale_pending(ticket: &Ticket, now: DateTime<Utc>, config: &DeskConfig) -> bool {
    ticket.status.is_pending_review()
        && ticket.hours_since_submission(now) > config.pending_review_hours
}

fn is_breached(ticket: &Ticket, now: DateTime<Utc>, config: &DeskConfig) -> bool {
    !ticket.status.is_terminal() && ticket.hours_since_submission(now) > config.sla_window_hours
}
