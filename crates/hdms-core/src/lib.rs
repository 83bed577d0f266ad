//! `hdms-core` - Helpdesk ticket aggregation library.
//!
//! Turns a ticket snapshot into the moderator dashboard: headline stats,
//! department workload, attention items, SLA alerts, recent activity and
//! distributions. Also holds the client session model: the inactivity guard,
//! cookie handling and the route gate.
//!
//! All aggregation is pure. Callers pass the snapshot and `now` explicitly.
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::{Local, Utc};
//! use hdms_core::{DeskConfig, FileSource, dashboard, load_snapshot};
//!
//! let snapshot = load_snapshot(&FileSource::new("tickets.json"), Vec::new());
//! let view = dashboard::compute(&snapshot.tickets, Utc::now(), &Local, &DeskConfig::default());
//! println!("{} SLA breaches", view.stats.sla_breaches);
//! ```

pub mod activity;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod model;
pub mod session;
pub mod sla;
pub mod source;
pub mod util;
pub mod validation;

/// Crate version, reported by `hdms version --json`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::DeskConfig;
pub use dashboard::DashboardSnapshot;
pub use error::{DeskError, Result};
pub use gate::{GateDecision, RouteGate};
pub use model::{Priority, Role, Status, Ticket};
pub use session::{CookieJar, CookieStore, SessionContext, SessionGuard};
pub use sla::SlaAlert;
pub use source::{FileSource, Snapshot, SnapshotOrigin, TicketSource, load_snapshot};
