//! Live elapsed clock: a ticking countup with an optional target ceiling.
//!
//! States: `Idle -> Running -> (Completed | Idle)`, with `Paused` reachable
//! from `Running`. While running, a background ticker advances the current
//! instant every 100 ms and publishes the elapsed seconds into a watch slot,
//! independent of any rendering cycle. `elapsed` is always
//! `min(current - start, target)` and is non-decreasing while running.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;

use crate::state::StateCell;
use crate::utils::time::TimeSource;

const TICK_INTERVAL: StdDuration = StdDuration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

struct ClockInner {
    start_instant: DateTime<Utc>,
    current_instant: DateTime<Utc>,
    paused_at: Option<DateTime<Utc>>,
    target_seconds: Option<i64>,
    phase: ClockPhase,
    ticker: Option<JoinHandle<()>>,
}

impl ClockInner {
    fn elapsed_seconds(&self) -> i64 {
        let raw = (self.current_instant - self.start_instant).num_milliseconds() / 1000;
        match self.target_seconds {
            Some(target) => raw.min(target),
            None => raw,
        }
    }

    /// Moves the current instant forward and handles target completion.
    /// Only meaningful while running.
    fn advance(&mut self, now: DateTime<Utc>) -> i64 {
        self.current_instant = now;
        let elapsed = self.elapsed_seconds();
        if let Some(target) = self.target_seconds {
            if elapsed >= target {
                self.phase = ClockPhase::Completed;
            }
        }
        elapsed
    }

    fn ticker_alive(&self) -> bool {
        self.ticker.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

#[derive(Clone)]
pub struct LiveClock {
    inner: Arc<Mutex<ClockInner>>,
    elapsed: StateCell<i64>,
    time: Arc<dyn TimeSource>,
}

impl LiveClock {
    /// `target_seconds` is the optional ceiling (daily quota) past which the
    /// clock freezes and reports [`ClockPhase::Completed`].
    pub fn new(time: Arc<dyn TimeSource>, target_seconds: Option<i64>) -> Self {
        let now = time.now();
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                start_instant: now,
                current_instant: now,
                paused_at: None,
                target_seconds,
                phase: ClockPhase::Idle,
                ticker: None,
            })),
            elapsed: StateCell::new(0),
            time,
        }
    }

    /// Starts (or restarts) counting with `initial_elapsed_seconds` already
    /// on the clock. Idempotent: a running ticker is never duplicated.
    pub fn start(&self, initial_elapsed_seconds: i64) {
        let mut inner = self.lock();
        let now = self.time.now();
        inner.start_instant = now - Duration::seconds(initial_elapsed_seconds);
        inner.current_instant = now;
        inner.paused_at = None;
        inner.phase = ClockPhase::Running;
        self.elapsed.set(inner.elapsed_seconds());
        if !inner.ticker_alive() {
            inner.ticker = Some(self.spawn_ticker());
        }
    }

    /// Freezes the clock; no time is counted until [`LiveClock::resume`].
    pub fn pause(&self) {
        let mut inner = self.lock();
        if inner.phase != ClockPhase::Running {
            return;
        }
        let now = self.time.now();
        let elapsed = inner.advance(now);
        self.elapsed.set(elapsed);
        if inner.phase == ClockPhase::Running {
            inner.paused_at = Some(now);
            inner.phase = ClockPhase::Paused;
        }
    }

    /// Resumes counting; the paused span is excluded from elapsed time.
    pub fn resume(&self) {
        let mut inner = self.lock();
        if inner.phase != ClockPhase::Paused {
            return;
        }
        let now = self.time.now();
        if let Some(paused_at) = inner.paused_at.take() {
            inner.start_instant += now - paused_at;
        }
        inner.current_instant = now;
        inner.phase = ClockPhase::Running;
        self.elapsed.set(inner.elapsed_seconds());
        if !inner.ticker_alive() {
            inner.ticker = Some(self.spawn_ticker());
        }
    }

    /// Rebases the clock to display a resting value without ticking.
    pub fn set_time(&self, elapsed_seconds: i64) {
        let mut inner = self.lock();
        let now = self.time.now();
        inner.start_instant = now - Duration::seconds(elapsed_seconds);
        inner.current_instant = now;
        self.elapsed.set(inner.elapsed_seconds());
    }

    /// Zeroes the clock and returns to [`ClockPhase::Idle`].
    pub fn reset(&self) {
        let mut inner = self.lock();
        let now = self.time.now();
        inner.start_instant = now;
        inner.current_instant = now;
        inner.paused_at = None;
        inner.phase = ClockPhase::Idle;
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
        self.elapsed.set(0);
    }

    /// Cancels the ticker; the clock remains at its last elapsed value.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if inner.phase == ClockPhase::Running {
            let now = self.time.now();
            let elapsed = inner.advance(now);
            self.elapsed.set(elapsed);
        }
        if inner.phase != ClockPhase::Completed {
            inner.phase = ClockPhase::Idle;
        }
        inner.paused_at = None;
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
    }

    /// Current elapsed seconds. While running this also advances the clock,
    /// so reads are accurate between ticks.
    pub fn elapsed_seconds(&self) -> i64 {
        let mut inner = self.lock();
        if inner.phase == ClockPhase::Running {
            let now = self.time.now();
            let elapsed = inner.advance(now);
            self.elapsed.set(elapsed);
            elapsed
        } else {
            inner.elapsed_seconds()
        }
    }

    pub fn phase(&self) -> ClockPhase {
        self.lock().phase
    }

    /// Change-notified stream of elapsed seconds for display layers.
    pub fn subscribe_elapsed(&self) -> tokio::sync::watch::Receiver<i64> {
        self.elapsed.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let weak: Weak<Mutex<ClockInner>> = Arc::downgrade(&self.inner);
        let elapsed_cell = self.elapsed.clone();
        let time = Arc::clone(&self.time);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
                match inner.phase {
                    ClockPhase::Running => {
                        let elapsed = inner.advance(time.now());
                        elapsed_cell.set(elapsed);
                        if inner.phase == ClockPhase::Completed {
                            inner.ticker = None;
                            break;
                        }
                    }
                    // Keep the subscription alive across a pause.
                    ClockPhase::Paused => {}
                    ClockPhase::Idle | ClockPhase::Completed => {
                        inner.ticker = None;
                        break;
                    }
                }
            }
        })
    }
}
