pub mod activity;
pub mod holiday;
pub mod interval;
pub mod recovery;
