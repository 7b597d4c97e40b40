//! Realtime roster synchronization.
//!
//! The engine keeps an in-memory mirror of the `customers` and `staff`
//! tables consistent with the store under concurrent writers:
//!
//! - [`mirror`]: the reactive local collections exposed to viewers
//! - [`listener`]: tasks that fold store change events into the mirror
//! - [`engine`]: the command layer and bootstrap/teardown lifecycle
//!
//! Every command writes to the store and lets the listener reflect the
//! result; mirror updates are idempotent upserts, so duplicate or
//! late-arriving events converge to the same state.

pub mod engine;
pub mod listener;
pub mod mirror;

pub use engine::{EngineError, RosterSyncEngine, SyncOptions};
pub use mirror::RosterMirror;
