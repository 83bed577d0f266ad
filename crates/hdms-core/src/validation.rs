//! Ticket invariants checked at the snapshot boundary.
//!
//! These routines return structured validation errors and never modify the
//! ticket.

use crate::error::ValidationError;
use crate::model::Ticket;

/// Validates ticket fields and timestamp ordering.
pub struct TicketValidator;

impl TicketValidator {
    /// Validate a ticket and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any rule is violated.
    pub fn validate(ticket: &Ticket) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if ticket.id.trim().is_empty() {
            errors.push(ValidationError::new("id", "cannot be empty"));
        }

        // Timestamps: submitted <= assigned <= completed <= resolved, skipping absent ones.
        let chain = [
            ("submittedDate", Some(ticket.submitted_date)),
            ("assignedDate", ticket.assigned_date),
            ("completedDate", ticket.completed_date),
            ("resolvedDate", ticket.resolved_date),
        ];
        let mut previous: Option<(&str, chrono::DateTime<chrono::Utc>)> = None;
        for (field, value) in chain {
            let Some(value) = value else { continue };
            if let Some((prev_field, prev_value)) = previous {
                if value < prev_value {
                    errors.push(ValidationError::new(
                        field,
                        format!("cannot be before {prev_field}"),
                    ));
                }
            }
            previous = Some((field, value));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
