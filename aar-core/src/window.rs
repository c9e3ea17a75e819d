//! Activity window computation.
//!
//! Every report covers the same fixed lookback period across all
//! integrations. The window is recomputed from "now" at request time and is
//! never persisted.

use chrono::{DateTime, Duration, Utc};

/// Default lookback applied to all integration queries
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Half-open time range `[start, end)` queried from each integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ActivityWindow {
    /// Window ending now, looking back the given number of days
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// The standard report window
    pub fn last_week() -> Self {
        Self::last_days(DEFAULT_LOOKBACK_DAYS)
    }

    /// Whether a timestamp falls within the window
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Window start in RFC 3339 (upstream query parameter format)
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    /// Window end in RFC 3339
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }
}
