//! Link list persistence
//!
//! The whole collection lives in one slot as a JSON array of
//! `{"id", "name", "url"}` objects, in canonical (insertion) order.

use tracing::{debug, warn};

use crate::models::{LinkCollection, LinkRecord};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::slots::KeyValueSlot;

/// Slot key holding the serialized collection
pub const LINKS_KEY: &str = "links";

/// Reads and writes the link collection as a single blob
pub struct LinkStore<S> {
    slots: S,
}

impl<S: KeyValueSlot> LinkStore<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Load the collection, treating anything unreadable as empty
    ///
    /// A missing slot, a failed read and a blob that does not decode all
    /// yield an empty collection. Nothing is salvaged from a malformed blob.
    pub fn load(&self) -> LinkCollection {
        match self.try_load() {
            Ok(links) => links,
            Err(e) => {
                warn!("Discarding stored links: {}", e);
                LinkCollection::new()
            }
        }
    }

    /// Load the collection, surfacing read and decode errors
    ///
    /// A missing slot is not an error and yields an empty collection.
    pub fn try_load(&self) -> StorageResult<LinkCollection> {
        let Some(bytes) = self.slots.get(LINKS_KEY)? else {
            debug!("No stored links");
            return Ok(LinkCollection::new());
        };

        let links: Vec<LinkRecord> =
            serde_json::from_slice(&bytes).map_err(|source| StorageError::Deserialization {
                key: LINKS_KEY.to_string(),
                source,
            })?;
        debug!("Loaded {} link(s)", links.len());
        Ok(links)
    }

    /// Overwrite the stored collection
    ///
    /// On failure the previously stored blob is left untouched.
    pub fn save(&mut self, links: &[LinkRecord]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(links).map_err(StorageError::Serialization)?;
        self.slots.put(LINKS_KEY, &bytes)?;
        debug!("Saved {} link(s)", links.len());
        Ok(())
    }

    /// Get the underlying slot store
    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Get the underlying slot store mutably
    pub fn slots_mut(&mut self) -> &mut S {
        &mut self.slots
    }
}
