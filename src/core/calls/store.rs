//! In-memory call registry.

use dashmap::DashMap;

use super::record::CallRecord;

/// Thread-safe mapping of call id to [`CallRecord`].
///
/// Records are kept for the lifetime of the process. Every write to a single
/// call happens under that key's shard lock, so concurrent webhook deliveries
/// for the same call are applied one after the other.
#[derive(Debug, Default)]
pub struct CallStore {
    records: DashMap<String, CallRecord>,
}

impl CallStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Insert or overwrite the record keyed by its `call_id`
    pub fn put(&self, record: CallRecord) {
        self.records.insert(record.call_id.clone(), record);
    }

    /// Insert `record` unless a record with the same id already exists.
    ///
    /// Returns false when the id was taken; the existing record is kept.
    pub fn insert_new(&self, record: CallRecord) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.records.entry(record.call_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Snapshot of a single record
    pub fn get(&self, call_id: &str) -> Option<CallRecord> {
        self.records.get(call_id).map(|entry| entry.value().clone())
    }

    /// Read-modify-write of one record under its key lock.
    ///
    /// When no record exists, `init` builds one first. The closure's result is
    /// returned together with a snapshot of the record after the update.
    pub fn upsert_with<R>(
        &self,
        call_id: &str,
        init: impl FnOnce() -> CallRecord,
        update: impl FnOnce(&mut CallRecord) -> R,
    ) -> (R, CallRecord) {
        let mut entry = self.records.entry(call_id.to_string()).or_insert_with(init);
        let result = update(entry.value_mut());
        (result, entry.value().clone())
    }

    /// Read-modify-write of an existing record; `None` if the id is unknown
    pub fn update<R>(&self, call_id: &str, update: impl FnOnce(&mut CallRecord) -> R) -> Option<R> {
        self.records
            .get_mut(call_id)
            .map(|mut entry| update(entry.value_mut()))
    }

    /// Lazily iterate over snapshots of every record, in no particular order.
    ///
    /// Each call starts a fresh pass over the registry.
    pub fn list(&self) -> impl Iterator<Item = CallRecord> + '_ {
        self.records.iter().map(|entry| entry.value().clone())
    }

    /// Number of calls not yet in a terminal status
    pub fn active_count(&self) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
