//! Text formatting functions for `hdms`.
//!
//! Plain (non-ANSI) terminal output:
//! - SLA markers (✗ breached, ⚠ approaching)
//! - Attention priority badges
//! - Column padding that respects display width

use chrono::{DateTime, Utc};
use hdms_core::DashboardSnapshot;
use hdms_core::activity::ActivityEntry;
use hdms_core::dashboard::{AttentionItem, DashboardStats, DepartmentWorkload, DistributionEntry};
use hdms_core::sla::SlaAlert;
use unicode_width::UnicodeWidthStr;

/// Marker characters.
pub mod icons {
    /// SLA window exceeded.
    pub const BREACHED: &str = "✗";
    /// Inside the final quarter of the SLA window.
    pub const APPROACHING: &str = "⚠";
}

/// Pad `text` with spaces to `width` display columns.
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - used))
}

/// Cut `text` to at most `width` display columns, marking the cut with `…`.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Render hours as `2d 5h`, `7h` or `35m`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_hours(hours: f64) -> String {
    let hours = hours.max(0.0);
    if hours < 1.0 {
        return format!("{}m", (hours * 60.0).floor() as u64);
    }
    let whole = hours.floor() as u64;
    let (days, rest) = (whole / 24, whole % 24);
    match (days, rest) {
        (0, h) => format!("{h}h"),
        (d, 0) => format!("{d}d"),
        (d, h) => format!("{d}d {h}h"),
    }
}

/// Format an instant for display, minute precision.
#[must_use]
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}

/// Headline counters, one `label  value` per line.
#[must_use]
pub fn stats_lines(stats: &DashboardStats) -> Vec<String> {
    let rows = [
        ("Pending review", stats.pending_review.to_string()),
        ("Active tickets", stats.total_active_tickets.to_string()),
        ("Assigned today", stats.tickets_assigned_today.to_string()),
        (
            "Avg resolution",
            format!("{}h", stats.average_resolution_time),
        ),
        ("SLA breaches", stats.sla_breaches.to_string()),
    ];
    rows.iter()
        .map(|(label, value)| format!("{}{value}", pad(label, 18)))
        .collect()
}

/// `✗ HD-2024-001  Printer jam  overdue 18h`
#[must_use]
pub fn format_alert_line(alert: &SlaAlert<'_>) -> String {
    let (icon, timing) = if alert.is_breached {
        (
            icons::BREACHED,
            format!("overdue {}", format_hours(alert.time_overdue.unwrap_or(0.0))),
        )
    } else {
        (
            icons::APPROACHING,
            format!("{} left", format_hours(alert.time_remaining.unwrap_or(0.0))),
        )
    };
    format!(
        "{icon} {}  {}  {timing}",
        pad(&alert.ticket.ticket_id, 12),
        pad(&truncate(&alert.ticket.subject, 40), 40),
    )
}

/// `[high]   HD-2024-001  Pending review for 2 days`
#[must_use]
pub fn format_attention_line(item: &AttentionItem<'_>) -> String {
    format!(
        "{} {}  {}",
        pad(&format!("[{}]", item.priority.as_str()), 8),
        pad(&item.ticket.ticket_id, 12),
        item.reason
    )
}

/// `IT          12  medium`
#[must_use]
pub fn format_workload_line(workload: &DepartmentWorkload, name_width: usize) -> String {
    format!(
        "{}  {:>4}  {}",
        pad(&workload.department, name_width),
        workload.active_tickets,
        workload.load_level.as_str()
    )
}

/// `2024-06-01 10:00  Ticket Assigned  HD-2024-008: VPN down (Moderator User)`
#[must_use]
pub fn format_activity_line(entry: &ActivityEntry<'_>) -> String {
    format!(
        "{}  {}  {} ({})",
        format_timestamp(&entry.timestamp),
        pad(entry.title, 15),
        entry.description,
        entry.user
    )
}

/// `Urgent     3`
#[must_use]
pub fn format_distribution_line(entry: &DistributionEntry) -> String {
    format!("{}{:>4}", pad(entry.label, 12), entry.count)
}

/// Full multi-section dashboard.
#[must_use]
pub fn dashboard_text(view: &DashboardSnapshot<'_>) -> String {
    let mut out = Vec::new();

    out.extend(stats_lines(&view.stats));

    section(&mut out, "Department workload", &view.department_workload, |w| {
        let width = view
            .department_workload
            .iter()
            .map(|d| d.department.width())
            .max()
            .unwrap_or(0);
        format_workload_line(w, width)
    });
    section(
        &mut out,
        "Requires attention",
        &view.tickets_requiring_attention,
        format_attention_line,
    );
    section(&mut out, "SLA alerts", &view.sla_alerts, format_alert_line);
    section(
        &mut out,
        "Recent activity",
        &view.recent_activity,
        format_activity_line,
    );
    section(
        &mut out,
        "Priority distribution",
        &view.priority_distribution,
        format_distribution_line,
    );
    section(
        &mut out,
        "Status distribution",
        &view.status_distribution,
        format_distribution_line,
    );

    out.join("\n")
}

fn section<T>(out: &mut Vec<String>, title: &str, items: &[T], line: impl Fn(&T) -> String) {
    out.push(String::new());
    out.push(format!("{title}:"));
    if items.is_empty() {
        out.push("  (none)".to_string());
    }
    out.extend(items.iter().map(|item| format!("  {}", line(item))));
}
