use super::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Record backend for `memory://` and for tests. Insertion order is kept so
/// that records created within the same millisecond still list newest first.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, fields: NewRecord) -> Result<Record, ApiError> {
        let record = fields.into_record();
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<Record>, ApiError> {
        let mut records: Vec<Record> = self.records.read().await.iter().rev().cloned().collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Record, ApiError> {
        let id = parse_id(id)?.to_string();
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}

/// Blob store double: validates like the real thing but keeps bytes in a map
/// so tests can observe what was (or was not) stored.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stored_names(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, upload: Upload) -> Result<String, ApiError> {
        let ext = checked_extension(&upload)?;
        let name = generated_name(&ext);
        self.blobs.write().await.insert(name.clone(), upload.bytes);
        Ok(name)
    }
}
