use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive holiday date range during which clock-in is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl HolidayRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
