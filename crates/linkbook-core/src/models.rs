//! Data models for linkbook
//!
//! A `LinkRecord` is one persisted name/URL pair. The canonical collection is
//! a plain `Vec<LinkRecord>` in insertion order; the sorted view is derived
//! from it for display only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved link: a free-text name and a free-text URL
///
/// Neither field is validated. A malformed URL is stored as-is and only
/// flagged when rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
    /// Unique identifier, never shown to the user
    pub id: Uuid,
    /// Display name (may be empty, not unique)
    pub name: String,
    /// The URL as typed
    pub url: String,
}

impl LinkRecord {
    /// Create a new record with a fresh id
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, url)
    }

    /// Create a record with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
        }
    }

    /// First eight characters of the id, for compact listings
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// The canonical, insertion-ordered collection
pub type LinkCollection = Vec<LinkRecord>;

/// Order records by name, ascending, comparing code points
///
/// The sort is stable so records with equal names keep their canonical order.
pub fn sort_by_name(links: &[LinkRecord]) -> Vec<LinkRecord> {
    let mut sorted = links.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

/// Observable state handed back to the presentation layer after every
/// controller operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListSnapshot {
    /// The sorted view
    pub links: Vec<LinkRecord>,
    /// Whether an undo is possible (the deleted slot holds a record)
    pub undo_available: bool,
}
