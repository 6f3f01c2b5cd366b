use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timezone used for all calendar-day and week-boundary decisions.
    pub time_zone: Tz,
    /// Daily work target in hours; the live clock freezes once it is reached.
    pub daily_quota_hours: u64,
    /// Weekly work target in hours, used for the progress percentage.
    pub weekly_quota_hours: u64,
    /// Directory backing the local recovery/activity slots.
    pub recovery_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let daily_quota_hours = env::var("DAILY_QUOTA_HOURS")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .unwrap_or(8);

        let weekly_quota_hours = env::var("WEEKLY_QUOTA_HOURS")
            .unwrap_or_else(|_| "40".to_string())
            .parse()
            .unwrap_or(40);

        let recovery_dir = env::var("RECOVERY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".punchclock"));

        Ok(Config {
            time_zone,
            daily_quota_hours,
            weekly_quota_hours,
            recovery_dir,
        })
    }

    pub fn daily_quota_seconds(&self) -> i64 {
        self.daily_quota_hours as i64 * 3600
    }

    pub fn weekly_quota_seconds(&self) -> i64 {
        self.weekly_quota_hours as i64 * 3600
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::UTC,
            daily_quota_hours: 8,
            weekly_quota_hours: 40,
            recovery_dir: PathBuf::from(".punchclock"),
        }
    }
}
