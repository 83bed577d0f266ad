/// Snapshot evaluated at `cli::NOW` (2024-06-10T12:00:00Z).
///
/// - `1` pending for 78h: stale, SLA breached by 6h
/// - `2` in progress for 58h: approaching, 14h left, assigned today
/// - `3` resolved after 48h
/// - `4` submitted 4h ago
/// - one entry without a submission date, which is dropped
pub const SNAPSHOT: &str = r#"{
  "results": [
    {
      "id": "1",
      "ticketId": "HD-2024-001",
      "subject": "Printer on floor 3 is jammed",
      "department": "IT",
      "priority": "high",
      "status": "pending",
      "requesterId": "r1",
      "requesterName": "Alex",
      "submittedDate": "2024-06-07T06:00:00Z"
    },
    {
      "id": "2",
      "ticketId": "HD-2024-002",
      "subject": "Payroll access",
      "department": "HR",
      "priority": "urgent",
      "status": "in_progress",
      "requesterId": "r2",
      "requesterName": "Sam",
      "moderatorName": "Moderator User",
      "submittedDate": "2024-06-08T02:00:00Z",
      "assignedDate": "2024-06-10T09:00:00Z"
    },
    {
      "id": "3",
      "ticketId": "HD-2024-003",
      "subject": "New laptop",
      "department": "IT",
      "priority": "low",
      "status": "resolved",
      "requesterId": "r3",
      "requesterName": "Kim",
      "submittedDate": "2024-06-01T12:00:00Z",
      "assignedDate": "2024-06-02T12:00:00Z",
      "resolvedDate": "2024-06-03T12:00:00Z"
    },
    {
      "id": "4",
      "ticketId": "HD-2024-004",
      "subject": "Badge reader offline",
      "department": "IT",
      "priority": "medium",
      "status": "submitted",
      "requesterId": "r4",
      "requesterName": "Lee",
      "submittedDate": "2024-06-10T08:00:00Z"
    },
    {
      "id": "5",
      "subject": "No submission date",
      "status": "pending"
    }
  ]
}"#;
