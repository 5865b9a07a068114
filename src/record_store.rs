use crate::{Record, RecordId, Result};

/// RecordStore is the id lookup table behind the [`Manager`](crate::Manager),
/// responsible for owning records and finding them by id.
///
/// Every operation is expected to be amortized O(1).
pub trait RecordStore {
    /// Add the record, fails with `AlreadyExists` if the id is taken
    fn insert(&mut self, record: Record) -> Result<()>;

    /// Remove the record, fails with `RecordNotFound` if the id is absent
    fn remove(&mut self, id: RecordId) -> Result<Record>;

    /// Get the record
    fn find(&self, id: RecordId) -> Option<&Record>;

    /// Number of stored records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
