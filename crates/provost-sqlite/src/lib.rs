//! SQLite backend for the provost [`DataConnector`] contract.
//!
//! One serialized connection behind a mutex, shared by all clones of
//! [`Store`]. Multi-statement cascades run inside a single transaction;
//! expiry purges are lazy, triggered by the next read, and tolerate
//! stale expired rows existing between reads.
//!
//! [`DataConnector`]: provost_core::DataConnector

mod rows;
pub mod schema;
pub mod store;
mod store_internal;

pub use store::Store;
