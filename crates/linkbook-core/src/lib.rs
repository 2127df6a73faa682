//! linkbook core library
//!
//! Keeps a locally persisted list of named links, shows it sorted by name,
//! and lets the most recent deletion be undone.
//!
//! # Architecture
//!
//! - **Slots**: whole-value key-value storage (SQLite by default)
//! - **LinkStore**: the collection as one JSON blob in the `links` slot
//! - **LinkListController**: add/delete/undo over the in-memory collection,
//!   saving after every mutation
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut links = LinkListController::open(&config)?;
//!
//! let view = links.add("Rust", "https://www.rust-lang.org");
//! for link in &view.links {
//!     println!("{} {}", link.name, link.url);
//! }
//! ```
//!
//! # Modules
//!
//! - `controller`: add/delete/undo state machine (main entry point)
//! - `models`: link record and sorted view
//! - `storage`: slot stores and link persistence
//! - `config`: application configuration

pub mod config;
pub mod controller;
pub mod models;
pub mod storage;

pub use config::Config;
pub use controller::LinkListController;
pub use models::{LinkCollection, LinkRecord, ListSnapshot};
pub use storage::{KeyValueSlot, LinkStore, MemorySlots, SqliteSlots, StorageError};
