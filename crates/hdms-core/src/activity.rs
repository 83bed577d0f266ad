//! Recent activity feed derived from ticket timestamps.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Ticket;

/// Tickets submitted within this many hours show up as "created" events.
pub const RECENT_CREATION_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Created,
    Assigned,
    Completed,
    Resolved,
}

impl ActivityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Resolved => "resolved",
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Created => "Ticket Created",
            Self::Assigned => "Ticket Assigned",
            Self::Completed => "Work Completed",
            Self::Resolved => "Ticket Resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry<'a> {
    /// `{ticket id}-{kind}`, unique per ticket and kind.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: &'static str,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub user: &'a str,
    pub ticket_id: &'a str,
}

impl<'a> ActivityEntry<'a> {
    fn new(ticket: &'a Ticket, kind: ActivityKind, timestamp: DateTime<Utc>, user: &'a str) -> Self {
        Self {
            id: format!("{}-{}", ticket.id, kind.as_str()),
            kind,
            title: kind.title(),
            description: format!("{}: {}", ticket.ticket_id, ticket.subject),
            timestamp,
            user,
            ticket_id: &ticket.id,
        }
    }
}

/// The newest `limit` lifecycle events across `tickets`.
#[must_use]
pub fn recent_activity(tickets: &[Ticket], now: DateTime<Utc>, limit: usize) -> Vec<ActivityEntry<'_>> {
    let mut entries = Vec::new();

    for ticket in tickets {
        if let Some(assigned) = ticket.assigned_date {
            let user = ticket.moderator_name.as_deref().unwrap_or("System");
            entries.push(ActivityEntry::new(ticket, ActivityKind::Assigned, assigned, user));
        }
        if let Some(completed) = ticket.completed_date {
            let user = ticket.assignee_name.as_deref().unwrap_or("Assignee");
            entries.push(ActivityEntry::new(ticket, ActivityKind::Completed, completed, user));
        }
        if let Some(resolved) = ticket.resolved_date {
            entries.push(ActivityEntry::new(
                ticket,
                ActivityKind::Resolved,
                resolved,
                &ticket.requester_name,
            ));
        }
        if ticket.hours_since_submission(now) < RECENT_CREATION_HOURS {
            entries.push(ActivityEntry::new(
                ticket,
                ActivityKind::Created,
                ticket.submitted_date,
                &ticket.requester_name,
            ));
        }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::model::fixtures::ticket;
    use chrono::Duration;

    #[test]
    fn test_feed_newest_first() {
        let now = Utc::now();
        let mut resolved = ticket("16", Status::Resolved, now, 100);
        resolved.assigned_date = Some(now - Duration::hours(98));
        resolved.completed_date = Some(now - Duration::hours(95));
        resolved.resolved_date = Some(now - Duration::hours(92));
        resolved.assignee_name = Some("IT Support Team".to_string());

        let mut assigned = ticket("8", Status::Assigned, now, 5);
        assigned.assigned_date = Some(now - Duration::hours(2));
        assigned.moderator_name = Some("Moderator User".to_string());

        let tickets = vec![resolved, assigned];
        let feed = recent_activity(&tickets, now, 10);
        let ids: Vec<&str> = feed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "8-assigned",
                "8-created",
                "16-resolved",
                "16-completed",
                "16-assigned"
            ]
        );
        assert_eq!(feed[0].user, "Moderator User");
        assert_eq!(feed[0].description, "HD-2024-008: Ticket 8");
        assert_eq!(feed[3].user, "IT Support Team");
        assert_eq!(feed[4].user, "System");
    }

    #[test]
    fn test_old_submissions_are_not_created_events() {
        let now = Utc::now();
        let tickets = vec![ticket("1", Status::Pending, now, 30)];
        assert!(recent_activity(&tickets, now, 10).is_empty());
    }

    #[test]
    fn test_feed_capped() {
        let now = Utc::now();
        let tickets: Vec<Ticket> = (0..20)
            .map(|i| ticket(&i.to_string(), Status::Pending, now, 1))
            .collect();
        assert_eq!(recent_activity(&tickets, now, 10).len(), 10);
    }
}
