//! Canonical guest collection
//!
//! Single source of truth for guest records. All mutation goes through the
//! engine task or the gateway, which hold the store behind one async mutex,
//! so operations are atomic with respect to each other and no two writers
//! ever interleave on the same key.

use std::collections::HashMap;

use gw_protocol::{GuestPatch, GuestRecord, GuestStats, InvitationId};

/// Keyed guest collection with stable insertion order
#[derive(Default)]
pub struct GuestStore {
    /// Records by key
    records: HashMap<InvitationId, GuestRecord>,
    /// Insertion order, for iteration stability
    order: Vec<InvitationId>,
    /// Keys with a local mutation in flight; counts nest
    edits: HashMap<InvitationId, u32>,
}

impl GuestStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get one record by key
    pub fn get(&self, id: &InvitationId) -> Option<GuestRecord> {
        self.records.get(id).cloned()
    }

    /// Read-only snapshot in insertion order
    pub fn list(&self) -> Vec<GuestRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// Aggregate counters over the current collection
    pub fn stats(&self) -> GuestStats {
        GuestStats::from_records(self.records.values())
    }

    /// Replace the whole collection from a bulk snapshot.
    ///
    /// Edit guards survive: a key being mutated locally keeps ignoring
    /// remote merges until its mutation resolves.
    pub fn replace_all(&mut self, records: Vec<GuestRecord>) {
        self.records.clear();
        self.order.clear();
        for record in records {
            self.upsert(record);
        }
    }

    /// Insert a record, or treat it as an update when the key exists.
    ///
    /// For an existing key only the record's populated fields land, so a
    /// creation event arriving after an update for the same key cannot
    /// clobber fields the update already set.
    pub fn upsert(&mut self, record: GuestRecord) {
        match self.records.get_mut(&record.invitation_id) {
            Some(existing) => {
                existing.apply(&record_as_patch(&record));
            }
            None => {
                self.order.push(record.invitation_id.clone());
                self.records.insert(record.invitation_id.clone(), record);
            }
        }
    }

    /// Merge a remote partial update.
    ///
    /// Ignored while the key has a local mutation in flight (the canonical
    /// response of that mutation supersedes it). An unknown key creates the
    /// record, so updates and additions converge in either arrival order.
    /// Returns whether the store changed.
    pub fn merge_remote(&mut self, patch: &GuestPatch) -> bool {
        if self.edit_in_flight(&patch.invitation_id) {
            tracing::debug!(
                id = %patch.invitation_id,
                "Ignoring remote merge while local mutation is in flight"
            );
            return false;
        }
        match self.records.get_mut(&patch.invitation_id) {
            Some(existing) => existing.apply(patch),
            None => {
                let mut record =
                    GuestRecord::new(patch.invitation_id.clone(), String::new());
                record.apply(patch);
                self.order.push(patch.invitation_id.clone());
                self.records.insert(patch.invitation_id.clone(), record);
            }
        }
        true
    }

    /// Apply a local optimistic patch unconditionally
    pub fn apply_local(&mut self, patch: &GuestPatch) {
        if let Some(existing) = self.records.get_mut(&patch.invitation_id) {
            existing.apply(patch);
        }
    }

    /// Roll an optimistic patch back to the captured prior values.
    ///
    /// Only the fields the patch touched are restored; concurrent changes
    /// to other fields survive.
    pub fn revert(&mut self, patch: &GuestPatch, prior: &GuestRecord) {
        if let Some(existing) = self.records.get_mut(&patch.invitation_id) {
            existing.restore(patch, prior);
        }
    }

    /// Overwrite a record with its server-confirmed canonical version
    pub fn replace_canonical(&mut self, record: GuestRecord) {
        match self.records.get_mut(&record.invitation_id) {
            Some(existing) => *existing = record,
            None => self.upsert(record),
        }
    }

    /// Delete a record. Removing an absent key is a no-op, not an error.
    /// Returns whether a record was removed.
    pub fn remove(&mut self, id: &InvitationId) -> bool {
        if self.records.remove(id).is_none() {
            return false;
        }
        self.order.retain(|key| key != id);
        self.edits.remove(id);
        true
    }

    /// Mark the start of a local mutation for a key
    pub fn begin_edit(&mut self, id: &InvitationId) {
        *self.edits.entry(id.clone()).or_insert(0) += 1;
    }

    /// Mark the end of a local mutation for a key
    pub fn finish_edit(&mut self, id: &InvitationId) {
        if let Some(count) = self.edits.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                self.edits.remove(id);
            }
        }
    }

    /// Whether a local mutation for this key is in flight
    pub fn edit_in_flight(&self, id: &InvitationId) -> bool {
        self.edits.contains_key(id)
    }
}

/// View a full record as a patch: scalar fields are always present,
/// unset optional fields are absent so they cannot clobber merged values.
fn record_as_patch(record: &GuestRecord) -> GuestPatch {
    GuestPatch {
        invitation_id: record.invitation_id.clone(),
        name: Some(record.name.clone()),
        phone: record.phone.clone(),
        invited: Some(record.invited),
        invitation_delivered: Some(record.invitation_delivered),
        invitation_response: Some(record.invitation_response),
        participation: Some(record.participation),
        table_number: record.table_number,
        table_position: record.table_position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> GuestRecord {
        GuestRecord::new(id, name)
    }

    #[test]
    fn test_upsert_existing_key_is_update_not_duplicate() {
        let mut store = GuestStore::new();
        store.upsert(record("inv-1", "Ana"));
        store.upsert(record("inv-1", "Ana María"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"inv-1".into()).unwrap().name, "Ana María");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut store = GuestStore::new();
        let guest = record("inv-1", "Ana");
        store.upsert(guest.clone());
        let once = store.list();
        store.upsert(guest);
        assert_eq!(store.list(), once);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = GuestStore::new();
        store.upsert(record("inv-c", "Carla"));
        store.upsert(record("inv-a", "Ana"));
        store.upsert(record("inv-b", "Bruno"));
        // updating must not reorder
        store.merge_remote(&GuestPatch::new("inv-c").with_table(4));

        let names: Vec<_> = store.list().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Carla", "Ana", "Bruno"]);
    }

    #[test]
    fn test_merge_sets_only_present_fields() {
        let mut store = GuestStore::new();
        store.upsert(record("inv-5", "Ana"));

        store.merge_remote(&GuestPatch::new("inv-5").with_table(12));

        let guest = store.get(&"inv-5".into()).unwrap();
        assert_eq!(guest.name, "Ana");
        assert_eq!(guest.table_number, Some(12));
    }

    #[test]
    fn test_out_of_order_convergence() {
        // added then updated
        let mut forward = GuestStore::new();
        forward.upsert(record("inv-9", "Iris"));
        forward.merge_remote(&GuestPatch::new("inv-9").with_table(3));

        // updated then added
        let mut reverse = GuestStore::new();
        reverse.merge_remote(&GuestPatch::new("inv-9").with_table(3));
        reverse.upsert(record("inv-9", "Iris"));

        assert_eq!(
            forward.get(&"inv-9".into()),
            reverse.get(&"inv-9".into())
        );
        let guest = forward.get(&"inv-9".into()).unwrap();
        assert_eq!(guest.name, "Iris");
        assert_eq!(guest.table_number, Some(3));
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut store = GuestStore::new();
        store.upsert(record("inv-1", "Ana"));

        assert!(!store.remove(&"inv-ghost".into()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_edit_guard_blocks_remote_merge() {
        let mut store = GuestStore::new();
        store.upsert(record("inv-1", "Ana"));

        store.begin_edit(&"inv-1".into());
        let applied = store.merge_remote(&GuestPatch::new("inv-1").with_table(9));
        assert!(!applied);
        assert_eq!(store.get(&"inv-1".into()).unwrap().table_number, None);

        store.finish_edit(&"inv-1".into());
        assert!(store.merge_remote(&GuestPatch::new("inv-1").with_table(9)));
        assert_eq!(store.get(&"inv-1".into()).unwrap().table_number, Some(9));
    }

    #[test]
    fn test_edit_guard_is_per_key() {
        let mut store = GuestStore::new();
        store.upsert(record("inv-1", "Ana"));
        store.upsert(record("inv-2", "Bruno"));

        store.begin_edit(&"inv-1".into());
        assert!(store.merge_remote(&GuestPatch::new("inv-2").with_table(2)));
    }

    #[test]
    fn test_revert_restores_prior_values() {
        let mut store = GuestStore::new();
        let mut guest = record("inv-1", "Ana");
        guest.participation = 2;
        store.upsert(guest);

        let prior = store.get(&"inv-1".into()).unwrap();
        let patch = GuestPatch::new("inv-1").with_participation(7);
        store.apply_local(&patch);
        assert_eq!(store.get(&"inv-1".into()).unwrap().participation, 7);

        store.revert(&patch, &prior);
        assert_eq!(store.get(&"inv-1".into()).unwrap().participation, 2);
    }

    #[test]
    fn test_stats_follow_the_collection() {
        let mut store = GuestStore::new();
        let mut guest = record("inv-1", "Ana");
        guest.invited = true;
        guest.invitation_delivered = true;
        guest.invitation_response = true;
        guest.participation = 3;
        store.upsert(guest);
        store.upsert(record("inv-2", "Bruno"));

        let stats = store.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.confirmed_headcount, 3);
    }
}
