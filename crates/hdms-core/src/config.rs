//! Policy knobs for SLA evaluation, dashboards and the session guard.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DeskError, Result};

/// Default SLA window: three days.
pub const DEFAULT_SLA_WINDOW_HOURS: f64 = 72.0;
/// Default inactivity limit before forced logout: three minutes.
pub const DEFAULT_INACTIVITY_LIMIT_SECONDS: u64 = 180;
/// Default cadence of the inactivity check.
pub const DEFAULT_CHECK_INTERVAL_MILLIS: u64 = 1_000;
/// Pending tickets older than this need a moderator's attention.
pub const DEFAULT_PENDING_REVIEW_HOURS: f64 = 24.0;
/// Default cap for ranked dashboard lists.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Policy configuration shared by every aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeskConfig {
    /// Hours after submission before a ticket breaches its SLA.
    #[serde(alias = "sla_window_hours")]
    pub sla_window_hours: f64,
    /// Seconds without user input before the session is expired.
    #[serde(alias = "inactivity_limit_seconds")]
    pub inactivity_limit_seconds: u64,
    /// Milliseconds between inactivity checks.
    #[serde(alias = "check_interval_millis")]
    pub check_interval_millis: u64,
    /// Hours a pending ticket may wait before it is flagged.
    #[serde(alias = "pending_review_hours")]
    pub pending_review_hours: f64,
    /// Maximum entries in the "requires attention" list.
    #[serde(alias = "attention_limit")]
    pub attention_limit: usize,
    /// Maximum entries in the SLA alert list.
    #[serde(alias = "alert_limit")]
    pub alert_limit: usize,
    /// Maximum entries in the recent activity feed.
    #[serde(alias = "activity_limit")]
    pub activity_limit: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            sla_window_hours: DEFAULT_SLA_WINDOW_HOURS,
            inactivity_limit_seconds: DEFAULT_INACTIVITY_LIMIT_SECONDS,
            check_interval_millis: DEFAULT_CHECK_INTERVAL_MILLIS,
            pending_review_hours: DEFAULT_PENDING_REVIEW_HOURS,
            attention_limit: DEFAULT_LIST_LIMIT,
            alert_limit: DEFAULT_LIST_LIMIT,
            activity_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl DeskConfig {
    /// Reject values that would make the aggregators meaningless.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if !self.sla_window_hours.is_finite() || self.sla_window_hours <= 0.0 {
            return Err(DeskError::Config(format!(
                "slaWindowHours must be a positive number, got {}",
                self.sla_window_hours
            )));
        }
        if self.inactivity_limit_seconds == 0 {
            return Err(DeskError::Config(
                "inactivityLimitSeconds must be greater than 0".to_string(),
            ));
        }
        if self.check_interval_millis == 0 {
            return Err(DeskError::Config(
                "checkIntervalMillis must be greater than 0".to_string(),
            ));
        }
        if !self.pending_review_hours.is_finite() || self.pending_review_hours < 0.0 {
            return Err(DeskError::Config(format!(
                "pendingReviewHours must be >= 0, got {}",
                self.pending_review_hours
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn inactivity_limit(&self) -> Duration {
        Duration::from_secs(self.inactivity_limit_seconds)
    }

    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_millis)
    }
}
