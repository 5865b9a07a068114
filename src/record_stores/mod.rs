mod hash_backed;
pub use hash_backed::HashRecordStore;
