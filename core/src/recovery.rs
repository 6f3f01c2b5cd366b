//! Recovery cache: persists the "currently running" offset so the live
//! clock survives process restarts.
//!
//! One opaque slot, keyed per profile. A loaded record is discarded when its
//! start instant does not fall on the current calendar day, and unparseable
//! content is treated as absent; both cases fall back to reconciling from
//! the authoritative interval list.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::models::recovery::RecoveryRecord;
use crate::stores::slot::SlotStorage;

const RECOVERY_KEY: &str = "recovery";

#[derive(Clone)]
pub struct RecoveryCache {
    storage: Arc<dyn SlotStorage>,
}

impl RecoveryCache {
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, record: &RecoveryRecord) {
        match serde_json::to_string(record) {
            Ok(json) => self.storage.set(RECOVERY_KEY, &json),
            Err(error) => tracing::warn!(%error, "failed to serialize recovery record"),
        }
    }

    /// Loads the record if it exists, parses, and was written today.
    /// Stale and corrupt records are dropped from the slot.
    pub fn load(&self, today: NaiveDate, tz: &Tz) -> Option<RecoveryRecord> {
        let raw = self.storage.get(RECOVERY_KEY)?;
        let record: RecoveryRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(%error, "corrupt recovery record, discarding");
                self.storage.remove(RECOVERY_KEY);
                return None;
            }
        };
        if !record.is_for_date(today, tz) {
            tracing::debug!("recovery record is from another day, discarding");
            self.storage.remove(RECOVERY_KEY);
            return None;
        }
        Some(record)
    }

    pub fn clear(&self) {
        self.storage.remove(RECOVERY_KEY);
    }
}
