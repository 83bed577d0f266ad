//! Core data types for hdms-core.
//!
//! Wire format is camelCase to match the helpdesk ticket service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeskError;

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    #[default]
    Pending,
    Submitted,
    Assigned,
    InProgress,
    Completed,
    Resolved,
    Closed,
    Rejected,
}

impl Status {
    pub const ALL: [Self; 9] = [
        Self::Draft,
        Self::Pending,
        Self::Submitted,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Resolved,
        Self::Closed,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable label used by dashboard distributions.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Submitted => "Submitted",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Rejected => "Rejected",
        }
    }

    /// SLA tracking stops once a ticket reaches one of these.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Rejected)
    }

    /// Waiting for a moderator to review it.
    #[must_use]
    pub const fn is_pending_review(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "assigned" => Ok(Self::Assigned),
            "in_progress" | "inprogress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "rejected" => Ok(Self::Rejected),
            other => Err(DeskError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Ticket priority as set by the requester.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Highest first, the order dashboards list them in.
    pub const DESCENDING: [Self; 4] = [Self::Urgent, Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(DeskError::InvalidPriority {
                priority: other.to_string(),
            }),
        }
    }
}

/// User role; each one owns a route prefix of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Assignee,
    Requestor,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Admin, Self::Moderator, Self::Assignee, Self::Requestor];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Assignee => "assignee",
            Self::Requestor => "requestor",
        }
    }

    #[must_use]
    pub fn dashboard_path(&self) -> String {
        format!("/{}/dashboard", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "assignee" => Ok(Self::Assignee),
            "requestor" => Ok(Self::Requestor),
            other => Err(DeskError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// A helpdesk ticket as seen by the dashboards.
///
/// Tickets are created and mutated by the ticket service; everything in this
/// crate only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub ticket_id: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub department: String,
    pub priority: Priority,
    pub status: Status,
    pub requester_id: String,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_name: Option<String>,
    pub submitted_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Fractional hours elapsed between submission and `now`.
    #[must_use]
    pub fn hours_since_submission(&self, now: DateTime<Utc>) -> f64 {
        crate::util::hours_between(self.submitted_date, now)
    }

    /// Hours from submission to resolution, if resolved.
    #[must_use]
    pub fn resolution_hours(&self) -> Option<f64> {
        self.resolved_date
            .map(|resolved| crate::util::hours_between(self.submitted_date, resolved))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Duration;

    /// Build a ticket submitted `hours_ago` hours before `now`.
    pub fn ticket(id: &str, status: Status, now: DateTime<Utc>, hours_ago: i64) -> Ticket {
        Ticket {
            id: id.to_string(),
            ticket_id: format!("HD-2024-{id:0>3}"),
            subject: format!("Ticket {id}"),
            description: String::new(),
            department: "IT".to_string(),
            priority: Priority::Medium,
            status,
            requester_id: format!("req-{id}"),
            requester_name: format!("Requester {id}"),
            assignee_id: None,
            assignee_name: None,
            moderator_id: None,
            moderator_name: None,
            submitted_date: now - Duration::hours(hours_ago),
            assigned_date: None,
            completed_date: None,
            resolved_date: None,
        }
    }
}
