use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::holiday::HolidayRange;

/// Source of the user's holiday ranges, consulted before clock-in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolidayProvider: Send + Sync {
    async fn current_holidays(&self) -> Result<Vec<HolidayRange>, StoreError>;
}

/// Provider with no holidays, for consumers that do not track them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHolidays;

#[async_trait]
impl HolidayProvider for NoHolidays {
    async fn current_holidays(&self) -> Result<Vec<HolidayRange>, StoreError> {
        Ok(Vec::new())
    }
}
