use std::collections::HashMap;

use crate::{Error, Record, RecordId, RecordStore, Result};

/// A [`RecordStore`] backed by a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct HashRecordStore {
    records: HashMap<RecordId, Record>,
}

impl HashRecordStore {
    /// Create a new `HashRecordStore`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new `HashRecordStore` with capacity
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            records: HashMap::with_capacity(cap),
        }
    }
}

impl RecordStore for HashRecordStore {
    fn insert(&mut self, record: Record) -> Result<()> {
        if self.records.contains_key(&record.id) {
            return Err(Error::AlreadyExists(record.id));
        }
        self.records.try_reserve(1)?;
        self.records.insert(record.id, record);
        Ok(())
    }

    fn remove(&mut self, id: RecordId) -> Result<Record> {
        self.records.remove(&id).ok_or(Error::RecordNotFound(id))
    }

    fn find(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store() {
        let mut store = HashRecordStore::with_capacity(4);
        assert!(store.is_empty());

        store.insert(Record::new(1, 2, 3)).unwrap();
        assert_eq!(
            store.insert(Record::new(1, 5, 5)),
            Err(Error::AlreadyExists(1))
        );
        assert_eq!(store.find(1).unwrap().group, 2);
        assert!(store.find(2).is_none());

        assert_eq!(store.remove(1).unwrap().score, 3);
        assert_eq!(store.remove(1), Err(Error::RecordNotFound(1)));
        assert_eq!(store.len(), 0);
    }
}
