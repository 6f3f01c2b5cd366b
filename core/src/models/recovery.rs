use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::time::local_date_of;

/// Ephemeral local record of an in-progress session, written so the live
/// clock can recompute its starting offset after a process restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    /// The instant the live clock considers itself started.
    pub start_time: DateTime<Utc>,
    /// Seconds already worked earlier the same calendar day.
    pub offset_seconds: i64,
}

impl RecoveryRecord {
    /// A record only applies to the calendar day it was written on.
    pub fn is_for_date(&self, date: NaiveDate, tz: &Tz) -> bool {
        local_date_of(self.start_time, tz) == date
    }
}
