pub mod holiday;
pub mod interval_store;
pub mod slot;
