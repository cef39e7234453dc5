// ABOUTME: In-memory implementations of the storage collaborators.
// ABOUTME: Guarded by parking_lot mutexes; never held across an await.

use super::{
    RecordPatch, ResourceRecord, ResourceStatus, ResourceStore, StoreError, TrackedTx,
    TrackedTxStatus, TxHistory,
};
use crate::types::TxHash;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Resource records keyed by resource name.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    records: Mutex<HashMap<String, ResourceRecord>>,
    upserts: Mutex<usize>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<ResourceRecord> {
        self.records.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Number of `upsert` calls seen, including replacements.
    pub fn upsert_count(&self) -> usize {
        *self.upserts.lock()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn upsert(&self, record: ResourceRecord) -> Result<(), StoreError> {
        *self.upserts.lock() += 1;
        self.records.lock().insert(record.key.clone(), record);
        Ok(())
    }

    async fn update_status(
        &self,
        key: &str,
        status: ResourceStatus,
        patch: RecordPatch,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        record.apply(status, patch);
        Ok(())
    }
}

/// Transaction history in insertion order.
#[derive(Debug, Default)]
pub struct MemoryTxHistory {
    entries: Mutex<Vec<TrackedTx>>,
}

impl MemoryTxHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<TrackedTx> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl TxHistory for MemoryTxHistory {
    async fn append(&self, tx: TrackedTx) -> Result<(), StoreError> {
        self.entries.lock().push(tx);
        Ok(())
    }

    async fn update_status(
        &self,
        hash: &TxHash,
        status: TrackedTxStatus,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        let entry = entries
            .iter_mut()
            .find(|e| &e.hash == hash)
            .ok_or_else(|| StoreError::NotFound(hash.to_string()))?;
        entry.status = status;
        Ok(())
    }
}
