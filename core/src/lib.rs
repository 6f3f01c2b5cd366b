//! Core engine for clock-in/clock-out time tracking with a live,
//! restart-surviving elapsed-time display.
//!
//! The [`services::session::ClockSessionManager`] owns the canonical interval
//! list (sourced from an external [`stores::interval_store::IntervalStore`])
//! and drives the [`clock::LiveClock`]. Daily/weekly totals and the activity
//! feed are derived views recomputed whenever the list changes. A small
//! [`recovery::RecoveryCache`] record lets the live clock resume with the
//! correct offset after a full process restart.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod recovery;
pub mod services;
pub mod state;
pub mod stores;
pub mod types;
pub mod utils;

pub use clock::{ClockPhase, LiveClock};
pub use config::Config;
pub use error::{InvariantError, StoreError};
pub use models::interval::{ClockInterval, IntervalPatch, NewInterval};
pub use models::recovery::RecoveryRecord;
pub use recovery::RecoveryCache;
pub use services::activity::ActivityProjection;
pub use services::session::{spawn_auth_listener, AuthEvent, ClockSessionManager};
pub use types::IntervalId;
