//! Error taxonomy for the tracking core.
//!
//! Invariant violations are rejected locally before any remote write and are
//! surfaced as values (a `false` return or an `Err`), never as panics. Remote
//! failures carry a generic, user-safe message; the underlying cause is
//! logged once at the boundary where it is first observed.

use thiserror::Error;

/// A local invariant check failed. Never reaches the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// The candidate interval overlaps an existing interval.
    #[error("interval overlaps an existing interval")]
    Overlap,

    /// An open session already exists; a second one may not be started.
    #[error("an open session already exists")]
    OpenSessionExists,

    /// `end_time` must be strictly after `start_time`.
    #[error("end time must be after start time")]
    EndBeforeStart,

    /// Clock-in rejected because today falls within a holiday range.
    #[error("clock-in is not allowed during a holiday")]
    OnHoliday,
}

/// A remote store operation failed. Local state is left unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write (create/update/delete/clock-in/clock-out) failed.
    #[error("the change could not be saved, please try again")]
    Write(#[source] anyhow::Error),

    /// A read (list) failed; aggregates degrade to an empty list.
    #[error("the interval list could not be loaded")]
    Read(#[source] anyhow::Error),
}
