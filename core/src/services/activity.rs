//! Recent-activity feed derived from the interval list.
//!
//! The most recent 15 intervals by start time are expanded into clock-in /
//! clock-out events, re-sorted by event timestamp descending, and capped to
//! 20 entries. A fingerprint of the last projected interval set is persisted
//! in its own local slot so a refresh carrying identical data skips the
//! recomputation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::activity::{ActivityEvent, ActivityKind};
use crate::models::interval::ClockInterval;
use crate::state::StateCell;
use crate::stores::slot::SlotStorage;
use crate::types::IntervalId;

const ACTIVITY_CACHE_KEY: &str = "activity";
const MAX_SOURCE_INTERVALS: usize = 15;
const MAX_EVENTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IntervalFingerprint {
    id: IntervalId,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration_seconds: Option<i64>,
}

impl From<&ClockInterval> for IntervalFingerprint {
    fn from(interval: &ClockInterval) -> Self {
        Self {
            id: interval.id,
            start_time: interval.start_time,
            end_time: interval.end_time,
            duration_seconds: interval.duration_seconds,
        }
    }
}

#[derive(Clone)]
pub struct ActivityProjection {
    storage: Arc<dyn SlotStorage>,
    events: StateCell<Vec<ActivityEvent>>,
}

impl ActivityProjection {
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self {
            storage,
            events: StateCell::new(Vec::new()),
        }
    }

    /// Reprojects the feed if `intervals` materially differs from the last
    /// seen set (count, or any id/start/end/duration). A fingerprint hit
    /// still projects when no feed is materialized yet (fresh process).
    pub fn refresh(&self, intervals: &[ClockInterval]) {
        let fingerprint: Vec<IntervalFingerprint> =
            intervals.iter().map(IntervalFingerprint::from).collect();

        if self.cached_fingerprint().as_ref() == Some(&fingerprint)
            && !(self.events.get().is_empty() && !intervals.is_empty())
        {
            tracing::debug!("interval set unchanged, skipping activity projection");
            return;
        }

        self.events.set(project(intervals));
        match serde_json::to_string(&fingerprint) {
            Ok(json) => self.storage.set(ACTIVITY_CACHE_KEY, &json),
            Err(error) => tracing::warn!(%error, "failed to serialize activity cache"),
        }
    }

    /// Snapshot of the current feed, newest first.
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Vec<ActivityEvent>> {
        self.events.subscribe()
    }

    /// Drops the feed and its persisted cache (logout hygiene).
    pub fn clear(&self) {
        self.storage.remove(ACTIVITY_CACHE_KEY);
        self.events.set(Vec::new());
    }

    fn cached_fingerprint(&self) -> Option<Vec<IntervalFingerprint>> {
        let raw = self.storage.get(ACTIVITY_CACHE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(cached) => Some(cached),
            Err(error) => {
                tracing::warn!(%error, "corrupt activity cache, discarding");
                self.storage.remove(ACTIVITY_CACHE_KEY);
                None
            }
        }
    }
}

fn project(intervals: &[ClockInterval]) -> Vec<ActivityEvent> {
    let mut recent: Vec<&ClockInterval> = intervals.iter().collect();
    recent.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    recent.truncate(MAX_SOURCE_INTERVALS);

    let mut events = Vec::with_capacity(recent.len() * 2);
    for interval in recent {
        events.push(ActivityEvent {
            interval_id: interval.id,
            kind: ActivityKind::ClockIn,
            at: interval.start_time,
        });
        if let Some(end) = interval.end_time {
            events.push(ActivityEvent {
                interval_id: interval.id,
                kind: ActivityKind::ClockOut,
                at: end,
            });
        }
    }

    events.sort_by(|a, b| b.at.cmp(&a.at));
    events.dedup_by(|a, b| a.interval_id == b.interval_id && a.kind == b.kind);
    events.truncate(MAX_EVENTS);
    events
}
