//! Append-only snapshot storage boundary.
//!
//! A snapshot is one branch's computed rows for one calendar date. Stores
//! never update or delete; readers pick records by date or by newest date.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemorySnapshotStore;
pub use postgres::PostgresSnapshotStore;
pub use r#trait::{AppendOutcome, PersistenceError, Snapshot, SnapshotRecord, SnapshotStore};
