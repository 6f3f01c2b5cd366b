use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvariantError;
use crate::types::IntervalId;

/// One recorded work session. An absent `end_time` means the interval is
/// open, i.e. currently running; its live elapsed time is computed on
/// demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockInterval {
    pub id: IntervalId,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds between start and end, derived on close. `None` while open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

impl ClockInterval {
    /// Creates an open interval starting now (store fakes and tests; the
    /// real store stamps its own start time).
    pub fn new_open(start_time: DateTime<Utc>) -> Self {
        Self {
            id: IntervalId::new(),
            start_time,
            end_time: None,
            duration_seconds: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closes the interval and derives its duration.
    pub fn close(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);
        self.duration_seconds = Some((end_time - self.start_time).num_seconds());
    }

    /// Stored duration for a closed interval, zero while open.
    pub fn closed_duration_seconds(&self) -> i64 {
        match self.end_time {
            Some(end) => self
                .duration_seconds
                .unwrap_or_else(|| (end - self.start_time).num_seconds()),
            None => 0,
        }
    }
}

/// Payload for a manual interval add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterval {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Payload for a manual interval edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalPatch {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Rejects an interval whose end is not strictly after its start.
pub fn validate_bounds(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), InvariantError> {
    match end {
        Some(end) if end <= start => Err(InvariantError::EndBeforeStart),
        _ => Ok(()),
    }
}

/// Checks a candidate span against the existing interval list.
///
/// Two intervals overlap when `candidate.start < other.end` and
/// `candidate.end > other.start`. An open *existing* interval blocks
/// everything after its start (its end is treated as unbounded); an open
/// *candidate* is validated as if it ended now. `exclude` skips the interval
/// being edited so it does not conflict with itself.
pub fn validate_no_overlap(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    existing: &[ClockInterval],
    now: DateTime<Utc>,
    exclude: Option<IntervalId>,
) -> Result<(), InvariantError> {
    validate_bounds(start, end)?;
    let candidate_end = end.unwrap_or(now);

    for other in existing {
        if Some(other.id) == exclude {
            continue;
        }
        let overlaps = match other.end_time {
            Some(other_end) => start < other_end && candidate_end > other.start_time,
            // Open interval: extends indefinitely until closed.
            None => candidate_end > other.start_time,
        };
        if overlaps {
            return Err(InvariantError::Overlap);
        }
    }
    Ok(())
}
