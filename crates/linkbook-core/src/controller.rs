//! Link list controller
//!
//! Owns the canonical collection and the deleted slot, and persists the
//! collection through `LinkStore` after every mutation.
//!
//! ## Deleted slot
//!
//! The slot remembers exactly one record: the most recently deleted one.
//! Deleting again overwrites it, so only the latest deletion can be undone.
//! Undo appends the record to the end of the collection; its original
//! position is not restored. The slot is never persisted.
//!
//! ## Usage
//!
//! ```ignore
//! let mut links = LinkListController::open(&config)?;
//!
//! let view = links.add("Acme", "https://acme.example");
//! let view = links.delete(view.links[0].id);
//! assert!(view.undo_available);
//! let view = links.undo_delete();
//! ```

use anyhow::{Context, Result};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{sort_by_name, LinkCollection, LinkRecord, ListSnapshot};
use crate::storage::{KeyValueSlot, LinkStore, SqliteSlots, StorageError, StorageResult};

/// Add/delete/undo logic over a persisted link collection
pub struct LinkListController<S> {
    /// Canonical collection, insertion order
    links: LinkCollection,
    /// Most recently deleted record
    deleted: Option<LinkRecord>,
    /// Persistence boundary
    store: LinkStore<S>,
    /// Error from the latest failed save, until taken
    save_error: Option<StorageError>,
}

impl LinkListController<SqliteSlots> {
    /// Open the on-disk store described by `config` and load its links
    pub fn open(config: &Config) -> Result<Self> {
        let slots = SqliteSlots::open(config).context("Failed to open link database")?;
        let mut controller = Self::new(LinkStore::new(slots));
        controller.load();
        Ok(controller)
    }
}

impl<S: KeyValueSlot> LinkListController<S> {
    /// Create a controller with an empty collection
    ///
    /// Call [`load`](Self::load) to populate it from the store.
    pub fn new(store: LinkStore<S>) -> Self {
        Self {
            links: LinkCollection::new(),
            deleted: None,
            store,
            save_error: None,
        }
    }

    /// Replace the collection with the stored one and clear the deleted slot
    pub fn load(&mut self) -> ListSnapshot {
        self.links = self.store.load();
        self.deleted = None;
        debug!("Controller loaded {} link(s)", self.links.len());
        self.snapshot()
    }

    // ==================== Transitions ====================

    /// Append a new link and persist
    ///
    /// `name` and `url` are stored verbatim. A failed save is logged and kept
    /// for [`take_save_error`](Self::take_save_error); the link stays added.
    pub fn add(&mut self, name: impl Into<String>, url: impl Into<String>) -> ListSnapshot {
        let result = self.try_add(name, url);
        self.settle(result)
    }

    /// Delete the link with `id`, remembering it for undo
    ///
    /// Unknown ids are ignored.
    pub fn delete(&mut self, id: Uuid) -> ListSnapshot {
        let result = self.try_delete(id);
        self.settle(result)
    }

    /// Re-append the most recently deleted link
    ///
    /// Does nothing when there is nothing to undo.
    pub fn undo_delete(&mut self) -> ListSnapshot {
        let result = self.try_undo_delete();
        self.settle(result)
    }

    /// Like [`add`](Self::add), but returns the save error
    ///
    /// The in-memory change is applied either way.
    pub fn try_add(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> StorageResult<ListSnapshot> {
        let link = LinkRecord::new(name, url);
        debug!(id = %link.id, "Adding link");
        self.links.push(link);
        self.persist()?;
        Ok(self.snapshot())
    }

    /// Like [`delete`](Self::delete), but returns the save error
    pub fn try_delete(&mut self, id: Uuid) -> StorageResult<ListSnapshot> {
        let Some(pos) = self.links.iter().position(|l| l.id == id) else {
            debug!(%id, "Delete ignored, no such link");
            return Ok(self.snapshot());
        };

        let link = self.links.remove(pos);
        if let Some(previous) = self.deleted.replace(link) {
            debug!(id = %previous.id, "Discarding earlier deletion");
        }
        debug!(%id, "Deleted link");
        self.persist()?;
        Ok(self.snapshot())
    }

    /// Like [`undo_delete`](Self::undo_delete), but returns the save error
    pub fn try_undo_delete(&mut self) -> StorageResult<ListSnapshot> {
        let Some(link) = self.deleted.take() else {
            debug!("Undo ignored, nothing deleted");
            return Ok(self.snapshot());
        };

        debug!(id = %link.id, "Restoring link");
        self.links.push(link);
        self.persist()?;
        Ok(self.snapshot())
    }

    // ==================== Queries ====================

    /// Links ordered by name
    pub fn sorted_view(&self) -> Vec<LinkRecord> {
        sort_by_name(&self.links)
    }

    /// Sorted view plus undo availability
    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            links: self.sorted_view(),
            undo_available: self.undo_available(),
        }
    }

    /// Whether the deleted slot holds a record
    pub fn undo_available(&self) -> bool {
        self.deleted.is_some()
    }

    /// The record an undo would restore
    pub fn deleted(&self) -> Option<&LinkRecord> {
        self.deleted.as_ref()
    }

    /// The canonical collection, in insertion order
    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    /// Find a link by id
    pub fn get(&self, id: Uuid) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Take the error from the latest save, if that save failed
    ///
    /// A later successful save clears it; no-op transitions leave it alone.
    pub fn take_save_error(&mut self) -> Option<StorageError> {
        self.save_error.take()
    }

    /// Get the persistence boundary
    pub fn store(&self) -> &LinkStore<S> {
        &self.store
    }

    /// Write the collection; a successful write supersedes any recorded failure
    fn persist(&mut self) -> StorageResult<()> {
        self.store.save(&self.links)?;
        self.save_error = None;
        Ok(())
    }

    fn settle(&mut self, result: StorageResult<ListSnapshot>) -> ListSnapshot {
        match result {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_recoverable() => {
                warn!("Failed to save links, keeping in-memory changes: {}", e);
                self.save_error = Some(e);
                self.snapshot()
            }
            Err(e) => {
                error!("Failed to save links: {}", e);
                self.save_error = Some(e);
                self.snapshot()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemorySlots, LINKS_KEY};
    use std::collections::HashSet;

    fn controller() -> LinkListController<MemorySlots> {
        LinkListController::new(LinkStore::new(MemorySlots::new()))
    }

    fn names(snapshot: &ListSnapshot) -> Vec<&str> {
        snapshot.links.iter().map(|l| l.name.as_str()).collect()
    }

    fn id_of(controller: &LinkListController<MemorySlots>, name: &str) -> Uuid {
        controller
            .links()
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.id)
            .unwrap()
    }

    fn stored(controller: &LinkListController<MemorySlots>) -> LinkCollection {
        controller.store().try_load().unwrap()
    }

    /// Slot store whose writes can be switched off
    #[derive(Default)]
    struct FlakySlots {
        inner: MemorySlots,
        fail_writes: bool,
    }

    impl KeyValueSlot for FlakySlots {
        fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn put(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
            if self.fail_writes {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "write refused",
                )));
            }
            self.inner.put(key, value)
        }
    }

    #[test]
    fn test_new_controller_is_empty() {
        let c = controller();
        assert!(c.links().is_empty());
        assert!(!c.undo_available());
        assert_eq!(c.snapshot(), ListSnapshot::default());
    }

    #[test]
    fn test_add_appends_and_persists() {
        let mut c = controller();

        let view = c.add("Acme", "https://acme.example");

        assert_eq!(names(&view), vec!["Acme"]);
        assert!(!view.undo_available);
        assert_eq!(stored(&c), c.links());
    }

    #[test]
    fn test_adds_have_unique_ids() {
        let mut c = controller();
        for i in 0..25 {
            c.add(format!("link {}", i % 3), "");
        }

        assert_eq!(c.links().len(), 25);
        let ids: HashSet<_> = c.links().iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn test_add_keeps_empty_and_untrimmed_input() {
        let mut c = controller();
        c.add("", "");
        c.add(" spaced ", " not a url ");

        assert_eq!(c.links()[0].name, "");
        assert_eq!(c.links()[1].name, " spaced ");
        assert_eq!(c.links()[1].url, " not a url ");
    }

    #[test]
    fn test_add_does_not_touch_deleted_slot() {
        let mut c = controller();
        c.add("Acme", "");
        c.delete(id_of(&c, "Acme"));

        let view = c.add("Bee", "");

        assert!(view.undo_available);
        assert_eq!(c.deleted().unwrap().name, "Acme");
    }

    #[test]
    fn test_sorted_view_orders_by_name_and_is_idempotent() {
        let mut c = controller();
        c.add("delta", "");
        c.add("Bravo", "");
        c.add("alpha", "");
        c.add("Charlie", "");

        let first = c.sorted_view();
        let second = c.sorted_view();

        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].name <= w[1].name));
        // Same records, only reordered
        let mut viewed: Vec<Uuid> = first.iter().map(|l| l.id).collect();
        let mut held: Vec<Uuid> = c.links().iter().map(|l| l.id).collect();
        viewed.sort();
        held.sort();
        assert_eq!(viewed, held);
        // Canonical order unchanged
        let canonical: Vec<_> = c.links().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(canonical, vec!["delta", "Bravo", "alpha", "Charlie"]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut c = controller();
        c.add("Acme", "");
        c.delete(id_of(&c, "Acme"));
        c.add("Bee", "");
        let before_links = c.links().to_vec();
        let before_deleted = c.deleted().cloned();

        let view = c.delete(Uuid::new_v4());

        assert_eq!(c.links(), before_links.as_slice());
        assert_eq!(c.deleted().cloned(), before_deleted);
        assert!(view.undo_available);
    }

    #[test]
    fn test_delete_unknown_id_on_fresh_controller_keeps_undo_off() {
        let mut c = controller();
        c.add("Acme", "");

        let view = c.delete(Uuid::new_v4());

        assert!(!view.undo_available);
        assert_eq!(names(&view), vec!["Acme"]);
    }

    #[test]
    fn test_delete_removes_exactly_one_and_fills_slot() {
        let mut c = controller();
        c.add("Acme", "a");
        c.add("Bee", "b");
        c.add("Cee", "c");
        let bee = c.get(id_of(&c, "Bee")).cloned().unwrap();

        let view = c.delete(bee.id);

        assert_eq!(names(&view), vec!["Acme", "Cee"]);
        assert!(view.undo_available);
        assert_eq!(c.deleted(), Some(&bee));
        assert!(stored(&c).iter().all(|l| l.id != bee.id));
    }

    #[test]
    fn test_second_delete_overwrites_slot() {
        let mut c = controller();
        c.add("Acme", "");
        c.add("Bee", "");
        c.add("Cee", "");
        let acme = id_of(&c, "Acme");
        let bee = id_of(&c, "Bee");

        c.delete(acme);
        c.delete(bee);
        assert_eq!(c.deleted().unwrap().id, bee);

        let view = c.undo_delete();
        assert_eq!(names(&view), vec!["Bee", "Cee"]);

        // Acme is gone for good
        let view = c.undo_delete();
        assert_eq!(names(&view), vec!["Bee", "Cee"]);
        assert!(c.get(acme).is_none());
    }

    #[test]
    fn test_undo_appends_at_end_and_clears_slot() {
        let mut c = controller();
        c.add("Acme", "");
        c.add("Bee", "");
        c.add("Cee", "");
        let acme = id_of(&c, "Acme");

        c.delete(acme);
        let view = c.undo_delete();

        assert!(!view.undo_available);
        assert!(c.deleted().is_none());
        let canonical: Vec<_> = c.links().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(canonical, vec!["Bee", "Cee", "Acme"]);
        assert_eq!(stored(&c), c.links());
        // Same record, same id
        assert_eq!(c.links()[2].id, acme);
    }

    #[test]
    fn test_second_undo_is_noop() {
        let mut c = controller();
        c.add("Acme", "");
        c.delete(id_of(&c, "Acme"));
        c.undo_delete();
        let before = c.links().to_vec();

        let view = c.undo_delete();

        assert_eq!(c.links(), before.as_slice());
        assert!(!view.undo_available);
    }

    #[test]
    fn test_undo_with_empty_slot_does_not_write() {
        let mut c = controller();

        c.undo_delete();

        assert!(c.store().slots().get(LINKS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_replaces_collection_and_clears_slot() {
        let mut slots = MemorySlots::new();
        let stored_links = vec![
            LinkRecord::new("Zed", "https://zed.example"),
            LinkRecord::new("Acme", "https://acme.example"),
        ];
        slots
            .put(LINKS_KEY, &serde_json::to_vec(&stored_links).unwrap())
            .unwrap();

        let mut c = LinkListController::new(LinkStore::new(slots));
        c.add("Transient", "");
        c.delete(id_of(&c, "Transient"));

        let view = c.load();

        assert_eq!(c.links(), stored_links.as_slice());
        assert!(!view.undo_available);
        assert_eq!(names(&view), vec!["Acme", "Zed"]);
    }

    #[test]
    fn test_load_from_corrupt_store_is_empty() {
        let mut slots = MemorySlots::new();
        slots.put(LINKS_KEY, b"\x00\x01garbage").unwrap();

        let mut c = LinkListController::new(LinkStore::new(slots));
        let view = c.load();

        assert!(view.links.is_empty());
        assert!(c.take_save_error().is_none());
    }

    #[test]
    fn test_failed_save_keeps_memory_state_and_old_blob() {
        let mut c = LinkListController::new(LinkStore::new(FlakySlots::default()));
        c.add("Acme", "");
        let persisted = c.store().try_load().unwrap();

        c.store.slots_mut().fail_writes = true;
        let view = c.add("Bee", "");

        assert_eq!(names(&view), vec!["Acme", "Bee"]);
        assert_eq!(c.store().try_load().unwrap(), persisted);
        assert!(c.take_save_error().is_some());
        assert!(c.take_save_error().is_none());
    }

    #[test]
    fn test_successful_save_clears_earlier_failure() {
        let mut c = LinkListController::new(LinkStore::new(FlakySlots::default()));
        c.store.slots_mut().fail_writes = true;
        c.add("Acme", "");

        c.store.slots_mut().fail_writes = false;
        c.add("Bee", "");

        assert!(c.take_save_error().is_none());
        assert_eq!(c.store().try_load().unwrap(), c.links());
    }

    #[test]
    fn test_noop_keeps_recorded_failure() {
        let mut c = LinkListController::new(LinkStore::new(FlakySlots::default()));
        c.store.slots_mut().fail_writes = true;
        c.add("Acme", "");

        c.store.slots_mut().fail_writes = false;
        c.delete(Uuid::new_v4());
        c.undo_delete();

        assert!(c.take_save_error().is_some());
    }

    #[test]
    fn test_try_variants_surface_save_errors() {
        let mut c = LinkListController::new(LinkStore::new(FlakySlots::default()));
        c.add("Acme", "");
        c.store.slots_mut().fail_writes = true;
        let acme = c.links()[0].id;

        assert!(c.try_add("Bee", "").is_err());
        assert!(c.try_delete(acme).is_err());
        assert!(c.undo_available());
        assert!(c.try_undo_delete().is_err());
        assert!(!c.undo_available());
        // No-ops never write, so they cannot fail
        assert!(c.try_delete(Uuid::new_v4()).is_ok());
        assert!(c.try_undo_delete().is_ok());
        // Non-try paths record nothing for these
        assert!(c.take_save_error().is_none());
    }

    #[test]
    fn test_acme_bee_scenario() {
        let mut c = controller();

        let view = c.add("Acme", "https://acme.example");
        assert_eq!(names(&view), vec!["Acme"]);
        let view = c.add("Bee", "not a url");
        assert_eq!(names(&view), vec!["Acme", "Bee"]);
        assert_eq!(view.links[1].url, "not a url");

        let view = c.delete(id_of(&c, "Acme"));
        assert_eq!(names(&view), vec!["Bee"]);
        assert!(view.undo_available);

        let view = c.undo_delete();
        assert_eq!(names(&view), vec!["Acme", "Bee"]);
        assert_eq!(view.links[0].url, "https://acme.example");
        assert!(!view.undo_available);
    }
}
