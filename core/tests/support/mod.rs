//! Shared fakes for integration tests: an in-memory interval store that
//! enforces the server-side rules (stamped times, single open interval) and
//! a fixed holiday provider.

// Each test binary compiles its own copy; not every binary uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use punchclock_core::config::Config;
use punchclock_core::error::StoreError;
use punchclock_core::models::holiday::HolidayRange;
use punchclock_core::models::interval::{ClockInterval, IntervalPatch, NewInterval};
use punchclock_core::stores::holiday::HolidayProvider;
use punchclock_core::stores::interval_store::IntervalStore;
use punchclock_core::stores::slot::{MemorySlotStorage, SlotStorage};
use punchclock_core::types::IntervalId;
use punchclock_core::utils::time::{ManualTimeSource, TimeSource};
use punchclock_core::ClockSessionManager;

pub fn monday_9am() -> DateTime<Utc> {
    // 2026-02-09 is a Monday.
    Utc.with_ymd_and_hms(2026, 2, 9, 9, 0, 0).unwrap()
}

pub struct FakeIntervalStore {
    time: Arc<ManualTimeSource>,
    intervals: Mutex<Vec<ClockInterval>>,
    pub fail_writes: Mutex<bool>,
}

impl FakeIntervalStore {
    pub fn new(time: Arc<ManualTimeSource>) -> Self {
        Self {
            time,
            intervals: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
        }
    }

    pub fn seed(&self, intervals: Vec<ClockInterval>) {
        *self.intervals.lock().unwrap() = intervals;
    }

    pub fn snapshot(&self) -> Vec<ClockInterval> {
        self.intervals.lock().unwrap().clone()
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Write(anyhow::anyhow!("injected write failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl IntervalStore for FakeIntervalStore {
    async fn list(&self) -> Result<Vec<ClockInterval>, StoreError> {
        Ok(self.snapshot())
    }

    async fn create(&self, new: NewInterval) -> Result<ClockInterval, StoreError> {
        self.check_writes()?;
        let mut interval = ClockInterval::new_open(new.start_time);
        if let Some(end) = new.end_time {
            interval.close(end);
        }
        self.intervals.lock().unwrap().push(interval.clone());
        Ok(interval)
    }

    async fn update(
        &self,
        id: IntervalId,
        patch: IntervalPatch,
    ) -> Result<ClockInterval, StoreError> {
        self.check_writes()?;
        let mut intervals = self.intervals.lock().unwrap();
        let interval = intervals
            .iter_mut()
            .find(|interval| interval.id == id)
            .ok_or_else(|| StoreError::Write(anyhow::anyhow!("no such interval")))?;
        interval.start_time = patch.start_time;
        match patch.end_time {
            Some(end) => interval.close(end),
            None => {
                interval.end_time = None;
                interval.duration_seconds = None;
            }
        }
        Ok(interval.clone())
    }

    async fn delete(&self, id: IntervalId) -> Result<(), StoreError> {
        self.check_writes()?;
        self.intervals
            .lock()
            .unwrap()
            .retain(|interval| interval.id != id);
        Ok(())
    }

    async fn clock_in(&self) -> Result<ClockInterval, StoreError> {
        self.check_writes()?;
        let mut intervals = self.intervals.lock().unwrap();
        if intervals.iter().any(ClockInterval::is_open) {
            return Err(StoreError::Write(anyhow::anyhow!("already clocked in")));
        }
        let interval = ClockInterval::new_open(self.time.now());
        intervals.push(interval.clone());
        Ok(interval)
    }

    async fn clock_out(&self) -> Result<ClockInterval, StoreError> {
        self.check_writes()?;
        let now = self.time.now();
        let mut intervals = self.intervals.lock().unwrap();
        let open = intervals
            .iter_mut()
            .find(|interval| interval.is_open())
            .ok_or_else(|| StoreError::Write(anyhow::anyhow!("not clocked in")))?;
        open.close(now);
        Ok(open.clone())
    }
}

pub struct FixedHolidays(pub Vec<HolidayRange>);

#[async_trait]
impl HolidayProvider for FixedHolidays {
    async fn current_holidays(&self) -> Result<Vec<HolidayRange>, StoreError> {
        Ok(self.0.clone())
    }
}

pub struct Harness {
    pub manager: Arc<ClockSessionManager>,
    pub store: Arc<FakeIntervalStore>,
    pub time: Arc<ManualTimeSource>,
    pub storage: Arc<MemorySlotStorage>,
}

pub fn harness() -> Harness {
    harness_with_holidays(Vec::new())
}

pub fn harness_with_holidays(holidays: Vec<HolidayRange>) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let time = Arc::new(ManualTimeSource::new(monday_9am()));
    let store = Arc::new(FakeIntervalStore::new(time.clone()));
    let storage = Arc::new(MemorySlotStorage::new());
    let manager = Arc::new(ClockSessionManager::new(
        store.clone() as Arc<dyn IntervalStore>,
        Arc::new(FixedHolidays(holidays)) as Arc<dyn HolidayProvider>,
        storage.clone() as Arc<dyn SlotStorage>,
        time.clone() as Arc<dyn TimeSource>,
        &Config::default(),
    ));
    Harness {
        manager,
        store,
        time,
        storage,
    }
}

/// Rebuilds the manager over the same local storage, as after a process
/// restart: the in-memory list and clock are gone, the slots survive.
pub fn restart(harness: &Harness) -> Harness {
    let manager = Arc::new(ClockSessionManager::new(
        harness.store.clone() as Arc<dyn IntervalStore>,
        Arc::new(FixedHolidays(Vec::new())) as Arc<dyn HolidayProvider>,
        harness.storage.clone() as Arc<dyn SlotStorage>,
        harness.time.clone() as Arc<dyn TimeSource>,
        &Config::default(),
    ));
    Harness {
        manager,
        store: harness.store.clone(),
        time: harness.time.clone(),
        storage: harness.storage.clone(),
    }
}

/// Lets background write tasks settle on the current-thread runtime.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
