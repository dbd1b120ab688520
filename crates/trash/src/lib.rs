//! Soft-delete subsystem for the repair-shop records.
//!
//! Deleting a record moves it, together with its dependents, into a shadow
//! collection where it can be inspected, restored or permanently purged.
//! A background [`Sweeper`] evicts entries older than the retention window.

mod engine;
mod error;
mod sweep;

pub use engine::{CascadeStats, TrashBin};
pub use error::{TrashError, TrashResult};
pub use sweep::{SweepStats, Sweeper};
