//! Ticket snapshot decoding and loading.
//!
//! The ticket service answers either with a bare JSON array or with a paged
//! object `{ "results": [...] }`. Both shapes go through [`TicketPayload`]
//! and come out as one canonical `Vec<Ticket>`. Individual entries that
//! cannot be trusted are dropped with a warning instead of failing the whole
//! snapshot.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DeskError, Result};
use crate::model::{Priority, Status, Ticket};
use crate::util::parse_timestamp;
use crate::validation::TicketValidator;

// ============================================================================
// Wire Types
// ============================================================================

/// The two response shapes of the ticket list endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TicketPayload {
    Bare(Vec<Value>),
    Paged {
        #[serde(default)]
        results: Vec<Value>,
    },
}

impl TicketPayload {
    #[must_use]
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            Self::Bare(entries) | Self::Paged { results: entries } => entries,
        }
    }
}

/// One ticket as sent by the service, before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketRecord {
    id: Option<Value>,
    #[serde(default, alias = "ticket_id")]
    ticket_id: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "requester_id")]
    requester_id: Option<Value>,
    #[serde(default, alias = "requester_name")]
    requester_name: Option<String>,
    #[serde(default, alias = "assignee_id")]
    assignee_id: Option<Value>,
    #[serde(default, alias = "assignee_name")]
    assignee_name: Option<String>,
    #[serde(default, alias = "moderator_id")]
    moderator_id: Option<Value>,
    #[serde(default, alias = "moderator_name")]
    moderator_name: Option<String>,
    #[serde(default, alias = "submitted_date")]
    submitted_date: Option<String>,
    #[serde(default, alias = "assigned_date")]
    assigned_date: Option<String>,
    #[serde(default, alias = "completed_date")]
    completed_date: Option<String>,
    #[serde(default, alias = "resolved_date")]
    resolved_date: Option<String>,
}

fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn optional_date(
    ticket: &str,
    field: &str,
    raw: Option<&str>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        warn!(ticket, field, raw, "Ignoring unparseable timestamp");
    }
    parsed
}

impl TryFrom<TicketRecord> for Ticket {
    type Error = DeskError;

    fn try_from(record: TicketRecord) -> Result<Self> {
        let id = id_text(record.id.as_ref()).ok_or_else(|| DeskError::validation("id", "missing"))?;

        let status: Status = record
            .status
            .as_deref()
            .ok_or_else(|| DeskError::validation("status", "missing"))?
            .parse()?;

        let priority = match record.priority.as_deref() {
            Some(raw) => raw.parse::<Priority>().unwrap_or_else(|_| {
                warn!(ticket = %id, raw, "Unknown priority, using medium");
                Priority::Medium
            }),
            None => Priority::Medium,
        };

        let submitted_date = record
            .submitted_date
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| DeskError::validation("submittedDate", "missing or unparseable"))?;

        let ticket = Self {
            ticket_id: record.ticket_id.unwrap_or_else(|| id.clone()),
            subject: record.subject.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            department: record.department.unwrap_or_default(),
            priority,
            status,
            requester_id: id_text(record.requester_id.as_ref()).unwrap_or_default(),
            requester_name: record.requester_name.unwrap_or_default(),
            assignee_id: id_text(record.assignee_id.as_ref()),
            assignee_name: record.assignee_name,
            moderator_id: id_text(record.moderator_id.as_ref()),
            moderator_name: record.moderator_name,
            submitted_date,
            assigned_date: optional_date(&id, "assignedDate", record.assigned_date.as_deref()),
            completed_date: optional_date(&id, "completedDate", record.completed_date.as_deref()),
            resolved_date: optional_date(&id, "resolvedDate", record.resolved_date.as_deref()),
            id,
        };

        TicketValidator::validate(&ticket).map_err(DeskError::from_validation_errors)?;
        Ok(ticket)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Normalize payload entries, dropping the ones that fail to decode.
#[must_use]
pub fn decode_entries(entries: Vec<Value>) -> Vec<Ticket> {
    let total = entries.len();
    let tickets: Vec<Ticket> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let decoded = serde_json::from_value::<TicketRecord>(entry)
                .map_err(DeskError::from)
                .and_then(Ticket::try_from);
            match decoded {
                Ok(ticket) => Some(ticket),
                Err(e) => {
                    warn!(index, error = %e, "Skipping ticket entry");
                    None
                }
            }
        })
        .collect();

    debug!(total, kept = tickets.len(), "Decoded ticket payload");
    tickets
}

/// Decode a raw response body in either supported shape.
///
/// # Errors
///
/// Returns `Json` if the body is not a JSON array or object.
pub fn decode_payload(body: &str) -> Result<Vec<Ticket>> {
    let payload: TicketPayload = serde_json::from_str(body)?;
    Ok(decode_entries(payload.into_entries()))
}

// ============================================================================
// Sources
// ============================================================================

/// Something that can produce a ticket snapshot.
pub trait TicketSource {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Fetch the current ticket collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be obtained.
    fn fetch(&self) -> Result<Vec<Ticket>>;
}

/// Reads a snapshot from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TicketSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<Ticket>> {
        let body = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DeskError::FileNotFound(self.path.clone())
            } else {
                DeskError::Io(e)
            }
        })?;
        decode_payload(&body)
    }
}

/// Where a loaded snapshot came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    Live,
    Fallback { reason: String },
}

impl fmt::Display for SnapshotOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Fallback { reason } => write!(f, "fallback ({reason})"),
        }
    }
}

/// A ticket collection plus its provenance.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tickets: Vec<Ticket>,
    pub origin: SnapshotOrigin,
}

impl Snapshot {
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.origin, SnapshotOrigin::Fallback { .. })
    }
}

/// Fetch from `source`, substituting `fallback` when the fetch fails or
/// returns nothing. Never fails.
pub fn load_snapshot(source: &dyn TicketSource, fallback: Vec<Ticket>) -> Snapshot {
    match source.fetch() {
        Ok(tickets) if !tickets.is_empty() => {
            debug!(source = %source.describe(), count = tickets.len(), "Loaded live snapshot");
            Snapshot {
                tickets,
                origin: SnapshotOrigin::Live,
            }
        }
        Ok(_) => {
            warn!(source = %source.describe(), "Source returned no tickets, using fallback");
            Snapshot {
                tickets: fallback,
                origin: SnapshotOrigin::Fallback {
                    reason: "source returned no tickets".to_string(),
                },
            }
        }
        Err(e) => {
            warn!(source = %source.describe(), error = %e, "Source unavailable, using fallback");
            Snapshot {
                tickets: fallback,
                origin: SnapshotOrigin::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}
