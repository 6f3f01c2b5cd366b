//! Interval store trait for dependency injection and testing.
//!
//! The external store is the durable owner of the interval list; everything
//! here is scoped to the authenticated user server-side. The trait can be
//! mocked with mockall (`MockIntervalStore`) in unit tests.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::interval::{ClockInterval, IntervalPatch, NewInterval};
use crate::types::IntervalId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntervalStore: Send + Sync {
    /// All intervals for the authenticated user.
    async fn list(&self) -> Result<Vec<ClockInterval>, StoreError>;

    /// Creates a manually entered interval.
    async fn create(&self, new: NewInterval) -> Result<ClockInterval, StoreError>;

    /// Rewrites an interval's start/end.
    async fn update(&self, id: IntervalId, patch: IntervalPatch)
        -> Result<ClockInterval, StoreError>;

    /// Deletes an interval.
    async fn delete(&self, id: IntervalId) -> Result<(), StoreError>;

    /// Opens a new interval; the server stamps the start time.
    async fn clock_in(&self) -> Result<ClockInterval, StoreError>;

    /// Closes the caller's open interval; the server stamps the end time.
    async fn clock_out(&self) -> Result<ClockInterval, StoreError>;
}
