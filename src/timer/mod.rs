//! Tournament clock engine
//!
//! The engine is pure: transitions map a record to a new record and
//! snapshots map a record plus the current time to a view. Persisting
//! the results is the store's job.

pub mod snapshot;
pub mod state;

pub use snapshot::{snapshot, Snapshot};
pub use state::{TimerState, TimerStatus, Transition};
