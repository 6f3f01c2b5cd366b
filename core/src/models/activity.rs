use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::IntervalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ClockIn,
    ClockOut,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::ClockIn => "clock_in",
            ActivityKind::ClockOut => "clock_out",
        }
    }
}

/// One entry in the recent-activity feed, derived from an interval: an open
/// interval yields only its clock-in event, a closed one yields both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub interval_id: IntervalId,
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
}
