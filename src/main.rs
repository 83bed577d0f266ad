//! `hdms_desk` (hdms) - Helpdesk moderator dashboard
//!
//! Computes the moderator dashboard and SLA alerts from a ticket snapshot,
//! gates routes by auth cookies and runs the inactivity session guard.

use hdms_desk::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
