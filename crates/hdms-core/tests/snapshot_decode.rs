use std::fs;

use chrono::{TimeZone, Utc};
use hdms_core::source::decode_payload;
use hdms_core::{DeskConfig, FileSource, Status, dashboard, load_snapshot};
use tempfile::TempDir;

const BARE: &str = r#"[
  {"id": 1, "ticketId": "HD-2024-001", "subject": "Email down", "department": "IT",
   "priority": "urgent", "status": "pending", "requesterName": "Ana",
   "submittedDate": "2024-06-08T12:00:00Z"},
  {"id": 2, "ticketId": "HD-2024-002", "subject": "Desk move", "department": "Facilities",
   "priority": "low", "status": "closed", "requesterName": "Bo",
   "submittedDate": "2024-06-01T09:00:00Z", "resolvedDate": "2024-06-02T09:00:00Z"},
  {"id": 3, "subject": "Broken order", "status": "resolved",
   "submittedDate": "2024-06-05T09:00:00Z", "resolvedDate": "2024-06-04T09:00:00Z"}
]"#;

#[test]
fn bare_and_paged_payloads_decode_identically() {
    let paged = format!(r#"{{"results": {BARE}}}"#);
    let from_bare = decode_payload(BARE).unwrap();
    let from_paged = decode_payload(&paged).unwrap();
    assert_eq!(from_bare, from_paged);
    // Ticket 3 resolves before it was submitted and is dropped.
    assert_eq!(from_bare.len(), 2);
    assert_eq!(from_bare[0].id, "1");
    assert_eq!(from_bare[1].status, Status::Closed);
}

#[test]
fn snapshot_file_feeds_dashboard() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tickets.json");
    fs::write(&path, BARE).unwrap();

    let snapshot = load_snapshot(&FileSource::new(&path), Vec::new());
    assert!(!snapshot.is_fallback());

    let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    let view = dashboard::compute(&snapshot.tickets, now, &Utc, &DeskConfig::default());
    assert_eq!(view.stats.pending_review, 1);
    assert_eq!(view.stats.total_active_tickets, 1);
    assert!((view.stats.average_resolution_time - 24.0).abs() < f64::EPSILON);
    assert_eq!(view.tickets_requiring_attention.len(), 1);
    assert_eq!(
        view.tickets_requiring_attention[0].reason,
        "Pending review for 2 days"
    );
}
