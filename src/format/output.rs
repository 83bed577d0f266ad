use hdms_core::{DashboardSnapshot, Snapshot, SnapshotOrigin};
use serde::Serialize;

use crate::guard::GuardExit;

/// Where the tickets behind a report came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub origin: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub ticket_count: usize,
}

impl From<&Snapshot> for SourceSummary {
    fn from(snapshot: &Snapshot) -> Self {
        let (origin, fallback_reason) = match &snapshot.origin {
            SnapshotOrigin::Live => ("live", None),
            SnapshotOrigin::Fallback { reason } => ("fallback", Some(reason.clone())),
        };
        Self {
            origin,
            fallback_reason,
            ticket_count: snapshot.tickets.len(),
        }
    }
}

/// A list report with its source.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReport<T: Serialize> {
    pub source: SourceSummary,
    pub items: Vec<T>,
}

/// Dashboard JSON: the snapshot fields plus `source`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport<'a> {
    pub source: SourceSummary,
    #[serde(flatten)]
    pub dashboard: DashboardSnapshot<'a>,
}

/// Result of a `session` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub exit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
    pub authenticated: bool,
    pub set_cookies: Vec<String>,
}

impl SessionReport {
    #[must_use]
    pub fn new(exit: &GuardExit, authenticated: bool, set_cookies: Vec<String>) -> Self {
        let (label, idle_secs, redirect) = match exit {
            GuardExit::Expired { idle_for, redirect } => {
                ("expired", Some(idle_for.as_secs()), Some(*redirect))
            }
            GuardExit::Stopped => ("stopped", None, None),
        };
        Self {
            exit: label,
            idle_secs,
            redirect,
            authenticated,
            set_cookies,
        }
    }
}
