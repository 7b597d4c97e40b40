//! FloorSync
//!
//! Front-of-house queue manager for a retail-style service floor. Tracks
//! customers waiting for assistance and the staff roster, and keeps both
//! synchronized in real time across viewing clients through the store's
//! row-change streams.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod store;
pub mod sync;

pub use config::{Config, ConfigError};
pub use models::{Appearance, Customer, CustomerType, NewCustomer, Outfit, Staff};
pub use store::{CustomerRow, RosterStore, RowChange, StaffRow};
pub use sync::{EngineError, RosterSyncEngine, SyncOptions};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
