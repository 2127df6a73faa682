//! Storage layer
//!
//! ## Architecture
//!
//! - **Slots**: whole-value key-value storage (SQLite table or in-memory map)
//! - **LinkStore**: the link collection serialized as JSON into one slot
//!
//! Every write replaces the slot value in a single transaction.

pub mod error;
pub mod link_store;
pub mod schema;
pub mod slots;

pub use error::{StorageError, StorageResult};
pub use link_store::{LinkStore, LINKS_KEY};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use slots::{KeyValueSlot, MemorySlots, SqliteSlots};
