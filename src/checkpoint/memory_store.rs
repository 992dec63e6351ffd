//! In-process checkpoint store.
//!
//! Records are held in their serialized form, so a load exercises the same
//! JSON round trip as the file store.

use super::{CheckpointRecord, CheckpointResult, CheckpointStore};
use crate::constants::files::CHECKPOINT_SUFFIX;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    records: RwLock<HashMap<String, String>>,
    saves: AtomicUsize,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves since creation
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn contains(&self, production_id: &str) -> bool {
        self.records.read().contains_key(production_id)
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    fn location(&self, production_id: &str) -> PathBuf {
        PathBuf::from("memory").join(format!("{production_id}{CHECKPOINT_SUFFIX}"))
    }

    async fn save(&self, record: &CheckpointRecord) -> CheckpointResult<PathBuf> {
        let payload = serde_json::to_string(record)?;
        self.records
            .write()
            .insert(record.production_id().to_string(), payload);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(self.location(record.production_id()))
    }

    async fn load(&self, production_id: &str) -> CheckpointResult<Option<CheckpointRecord>> {
        let payload = match self.records.read().get(production_id) {
            Some(payload) => payload.clone(),
            None => return Ok(None),
        };

        let record: CheckpointRecord = serde_json::from_str(&payload)?;
        record.verify(production_id, &self.location(production_id).display().to_string())?;
        Ok(Some(record))
    }

    async fn remove(&self, production_id: &str) -> CheckpointResult<bool> {
        Ok(self.records.write().remove(production_id).is_some())
    }

    async fn list(&self) -> CheckpointResult<Vec<String>> {
        let mut ids: Vec<String> = self.records.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
