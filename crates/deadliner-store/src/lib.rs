//! # deadliner-store
//!
//! SQLite-backed persistence for Deadliner: the task store, the deferred
//! reminder job queue, and the job handle store.

pub mod store;

pub use store::Store;
