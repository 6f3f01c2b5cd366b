//! Clock session manager: owns the in-memory interval list and drives the
//! live elapsed clock through clock-in/clock-out, manual edits, and
//! reconciliation against the authoritative store.
//!
//! Write disciplines differ deliberately: `clock_in`/`clock_out` answer from
//! local pre-checks and let the remote write settle in the background, while
//! manual edits and deletes apply locally only after the store acknowledges.
//! Invariant violations are logged once and surfaced as `false`/`Ok(false)`,
//! never as errors; remote failures surface as `StoreError` without touching
//! local state.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::clock::LiveClock;
use crate::config::Config;
use crate::error::{InvariantError, StoreError};
use crate::models::interval::{validate_no_overlap, ClockInterval, IntervalPatch, NewInterval};
use crate::models::recovery::RecoveryRecord;
use crate::recovery::RecoveryCache;
use crate::services::activity::ActivityProjection;
use crate::services::aggregate;
use crate::state::StateCell;
use crate::stores::holiday::HolidayProvider;
use crate::stores::interval_store::IntervalStore;
use crate::stores::slot::SlotStorage;
use crate::types::IntervalId;
use crate::utils::time::{local_date_of, TimeSource};

/// Session notifications from the auth collaborator.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    LoggedIn(String),
    LoggedOut,
}

pub struct ClockSessionManager {
    store: Arc<dyn IntervalStore>,
    holidays: Arc<dyn HolidayProvider>,
    recovery: RecoveryCache,
    clock: LiveClock,
    intervals: StateCell<Vec<ClockInterval>>,
    time: Arc<dyn TimeSource>,
    time_zone: Tz,
    weekly_quota_seconds: i64,
}

impl ClockSessionManager {
    pub fn new(
        store: Arc<dyn IntervalStore>,
        holidays: Arc<dyn HolidayProvider>,
        storage: Arc<dyn SlotStorage>,
        time: Arc<dyn TimeSource>,
        config: &Config,
    ) -> Self {
        let clock = LiveClock::new(Arc::clone(&time), Some(config.daily_quota_seconds()));
        Self {
            store,
            holidays,
            recovery: RecoveryCache::new(storage),
            clock,
            intervals: StateCell::new(Vec::new()),
            time,
            time_zone: config.time_zone,
            weekly_quota_seconds: config.weekly_quota_seconds(),
        }
    }

    /// Opens a new session. Returns `false` without any state change when an
    /// open session already exists or today falls within a holiday range.
    ///
    /// On success the recovery record is written, the live clock starts with
    /// today's already-worked seconds preloaded, and the remote write settles
    /// in the background; the interval list gains the created interval once
    /// the store acknowledges.
    pub async fn clock_in(&self) -> bool {
        let snapshot = self.intervals.get();
        if snapshot.iter().any(ClockInterval::is_open) {
            tracing::warn!("clock-in rejected: {}", InvariantError::OpenSessionExists);
            return false;
        }

        let now = self.time.now();
        let today = local_date_of(now, &self.time_zone);
        if self.is_holiday(today).await {
            tracing::info!(%today, "clock-in rejected: {}", InvariantError::OnHoliday);
            return false;
        }

        let offset = closed_seconds_on(&snapshot, today, &self.time_zone);
        self.recovery.save(&RecoveryRecord {
            start_time: now,
            offset_seconds: offset,
        });
        self.clock.start(offset);

        let store = Arc::clone(&self.store);
        let intervals = self.intervals.clone();
        tokio::spawn(async move {
            match store.clock_in().await {
                Ok(created) => intervals.update(|list| list.push(created)),
                Err(error) => tracing::error!(%error, "clock-in write failed"),
            }
        });
        true
    }

    /// Closes the open session. Returns `false` when none exists. The list
    /// update, clock stop, and recovery clear all wait for the store ack.
    pub async fn clock_out(&self) -> bool {
        let snapshot = self.intervals.get();
        if !snapshot.iter().any(ClockInterval::is_open) {
            tracing::warn!("clock-out rejected: no open session");
            return false;
        }

        let store = Arc::clone(&self.store);
        let intervals = self.intervals.clone();
        let clock = self.clock.clone();
        let recovery = self.recovery.clone();
        tokio::spawn(async move {
            match store.clock_out().await {
                Ok(closed) => {
                    intervals.update(|list| {
                        let idx = list
                            .iter()
                            .position(|interval| interval.id == closed.id)
                            .or_else(|| list.iter().position(|interval| interval.is_open()));
                        match idx {
                            Some(idx) => list[idx] = closed,
                            None => list.push(closed),
                        }
                    });
                    clock.stop();
                    recovery.clear();
                }
                Err(error) => tracing::error!(%error, "clock-out write failed"),
            }
        });
        true
    }

    /// Manually adds a closed (or open) interval. `Ok(false)` means the
    /// overlap/bounds validator rejected it locally; nothing was sent.
    pub async fn add_interval(&self, new: NewInterval) -> Result<bool, StoreError> {
        let snapshot = self.intervals.get();
        let now = self.time.now();
        if let Err(error) = validate_no_overlap(new.start_time, new.end_time, &snapshot, now, None)
        {
            tracing::warn!(%error, "manual interval add rejected");
            return Ok(false);
        }

        let created = self.store.create(new).await.map_err(|error| {
            tracing::error!(%error, "interval create failed");
            error
        })?;
        self.intervals.update(|list| list.push(created));
        Ok(true)
    }

    /// Rewrites an interval's start/end after local validation.
    pub async fn update_interval(&self, interval: ClockInterval) -> Result<bool, StoreError> {
        let snapshot = self.intervals.get();
        let now = self.time.now();
        if let Err(error) = validate_no_overlap(
            interval.start_time,
            interval.end_time,
            &snapshot,
            now,
            Some(interval.id),
        ) {
            tracing::warn!(%error, interval_id = %interval.id, "interval update rejected");
            return Ok(false);
        }

        let patch = IntervalPatch {
            start_time: interval.start_time,
            end_time: interval.end_time,
        };
        let updated = self
            .store
            .update(interval.id, patch)
            .await
            .map_err(|error| {
                tracing::error!(%error, interval_id = %interval.id, "interval update failed");
                error
            })?;
        self.intervals.update(|list| {
            if let Some(existing) = list.iter_mut().find(|i| i.id == updated.id) {
                *existing = updated;
            }
        });
        Ok(true)
    }

    /// Deletes an interval; the local list shrinks only after the store
    /// acknowledges.
    pub async fn delete_interval(&self, id: IntervalId) -> Result<(), StoreError> {
        self.store.delete(id).await.map_err(|error| {
            tracing::error!(%error, interval_id = %id, "interval delete failed");
            error
        })?;
        self.intervals
            .update(|list| list.retain(|interval| interval.id != id));
        Ok(())
    }

    /// Derives the live-clock state from a freshly loaded interval list.
    ///
    /// A recovery record written today is trusted outright: elapsed is
    /// recomputed from its start instant and offset, and the clock starts.
    /// Otherwise today's intervals decide: if the most recent one is still
    /// open the clock resumes from its live elapsed plus today's closed
    /// total; if not, the clock shows the resting total, stopped.
    pub fn reconcile(&self, fetched: Vec<ClockInterval>) {
        self.intervals.set(fetched);
        let snapshot = self.intervals.get();
        let now = self.time.now();
        let today = local_date_of(now, &self.time_zone);

        if let Some(record) = self.recovery.load(today, &self.time_zone) {
            let elapsed = (now - record.start_time).num_seconds() + record.offset_seconds;
            tracing::debug!(elapsed, "resuming live clock from recovery record");
            self.clock.start(elapsed);
            return;
        }

        let todays: Vec<&ClockInterval> = snapshot
            .iter()
            .filter(|interval| local_date_of(interval.start_time, &self.time_zone) == today)
            .collect();
        let closed_total: i64 = todays
            .iter()
            .map(|interval| interval.closed_duration_seconds())
            .sum();

        match todays.iter().max_by_key(|interval| interval.start_time) {
            Some(open) if open.is_open() => {
                let elapsed = (now - open.start_time).num_seconds() + closed_total;
                self.recovery.save(&RecoveryRecord {
                    start_time: open.start_time,
                    offset_seconds: closed_total,
                });
                tracing::debug!(elapsed, "open interval found, starting live clock");
                self.clock.start(elapsed);
            }
            _ => {
                self.clock.stop();
                self.clock.set_time(closed_total);
            }
        }
    }

    /// Reloads the interval list on login and reconciles. A failed load
    /// degrades to an empty list (empty aggregates), logged, not fatal.
    pub async fn handle_login(&self, username: &str) {
        tracing::info!(username, "loading intervals after login");
        match self.store.list().await {
            Ok(list) => self.reconcile(list),
            Err(error) => {
                tracing::warn!(%error, "interval list load failed, degrading to empty");
                self.intervals.set(Vec::new());
                self.clock.reset();
            }
        }
    }

    /// Clears all session-scoped state: interval list, live clock, and the
    /// recovery slot (which is keyed per profile, not per user).
    pub fn handle_logout(&self) {
        tracing::info!("clearing session state after logout");
        self.intervals.set(Vec::new());
        self.clock.reset();
        self.recovery.clear();
    }

    pub fn intervals(&self) -> Vec<ClockInterval> {
        self.intervals.get()
    }

    pub fn subscribe_intervals(&self) -> tokio::sync::watch::Receiver<Vec<ClockInterval>> {
        self.intervals.subscribe()
    }

    pub fn clock(&self) -> &LiveClock {
        &self.clock
    }

    /// Seconds worked today, counting a running session live.
    pub fn time_today(&self) -> i64 {
        aggregate::time_today(&self.intervals.get(), self.time.now(), &self.time_zone)
    }

    /// Seconds worked in the current Monday-Sunday week.
    pub fn time_this_week(&self) -> i64 {
        aggregate::time_this_week(&self.intervals.get(), self.time.now(), &self.time_zone)
    }

    /// Progress toward the weekly quota, clamped at 100.
    pub fn weekly_progress_percent(&self) -> f64 {
        aggregate::weekly_progress_percent(self.time_this_week(), self.weekly_quota_seconds)
    }

    async fn is_holiday(&self, date: NaiveDate) -> bool {
        let holidays = match self.holidays.current_holidays().await {
            Ok(holidays) => holidays,
            Err(error) => {
                tracing::warn!(%error, "holiday lookup failed, assuming none");
                Vec::new()
            }
        };
        holidays.iter().any(|range| range.contains(date))
    }
}

fn closed_seconds_on(intervals: &[ClockInterval], date: NaiveDate, tz: &Tz) -> i64 {
    intervals
        .iter()
        .filter(|interval| !interval.is_open() && local_date_of(interval.start_time, tz) == date)
        .map(|interval| interval.closed_duration_seconds())
        .sum()
}

/// Wires the session manager and activity projection to the auth
/// collaborator's event stream.
pub fn spawn_auth_listener(
    manager: Arc<ClockSessionManager>,
    activity: ActivityProjection,
    mut events: broadcast::Receiver<AuthEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::LoggedIn(username)) => manager.handle_login(&username).await,
                Ok(AuthEvent::LoggedOut) => {
                    manager.handle_logout();
                    activity.clear();
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
