//! Daily/weekly totals derived from the interval list.
//!
//! Pure functions, recomputed from scratch on every interval-list change.
//! Calendar decisions (which day an interval belongs to, week boundaries)
//! are made in the configured app timezone. Weeks are ISO weeks: Monday
//! 00:00:00.000 through Sunday 23:59:59.999, regardless of locale.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::models::interval::ClockInterval;
use crate::utils::time::local_date_of;

/// Seconds worked on `now`'s calendar day: closed durations plus the live
/// elapsed time of an open interval started today.
pub fn time_today(intervals: &[ClockInterval], now: DateTime<Utc>, tz: &Tz) -> i64 {
    let today = local_date_of(now, tz);
    intervals
        .iter()
        .filter(|interval| local_date_of(interval.start_time, tz) == today)
        .map(|interval| live_or_closed_seconds(interval, now))
        .sum()
}

/// Monday 00:00:00.000 and Sunday 23:59:59.999 of the ISO week containing
/// `date`, as naive local datetimes.
pub fn current_week_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);
    let start = monday.and_time(NaiveTime::MIN);
    let end = sunday.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN));
    (start, end)
}

/// Seconds worked in the ISO week containing `now`, same closed/open rule
/// as [`time_today`], filtered by each interval's start time.
pub fn time_this_week(intervals: &[ClockInterval], now: DateTime<Utc>, tz: &Tz) -> i64 {
    let (week_start, week_end) = current_week_bounds(local_date_of(now, tz));
    intervals
        .iter()
        .filter(|interval| {
            let local_start = interval.start_time.with_timezone(tz).naive_local();
            week_start <= local_start && local_start <= week_end
        })
        .map(|interval| live_or_closed_seconds(interval, now))
        .sum()
}

/// Progress toward the weekly quota, clamped at 100 even when over.
pub fn weekly_progress_percent(week_seconds: i64, weekly_quota_seconds: i64) -> f64 {
    if weekly_quota_seconds <= 0 {
        return 0.0;
    }
    (week_seconds as f64 / weekly_quota_seconds as f64 * 100.0).min(100.0)
}

fn live_or_closed_seconds(interval: &ClockInterval, now: DateTime<Utc>) -> i64 {
    if interval.is_open() {
        (now - interval.start_time).num_seconds().max(0)
    } else {
        interval.closed_duration_seconds()
    }
}
