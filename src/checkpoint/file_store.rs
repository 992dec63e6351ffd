//! File-backed checkpoint store: one JSON document per production under a
//! directory, replaced atomically on every save.

use super::{CheckpointError, CheckpointRecord, CheckpointResult, CheckpointStore};
use crate::constants::files::CHECKPOINT_SUFFIX;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const DIGEST_MARKER: char = '~';
const DIGEST_BYTES: usize = 8;

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    directory: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File-name-safe form of a production id.
    ///
    /// Ids made only of `[A-Za-z0-9._-]` are used as-is. Any other id is
    /// sanitized and suffixed with `~` plus a digest of the raw id, so two
    /// distinct ids never share a file.
    fn file_stem(production_id: &str) -> String {
        let is_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
        if !production_id.is_empty() && production_id.chars().all(is_safe) {
            return production_id.to_string();
        }

        let sanitized: String = production_id
            .chars()
            .map(|c| if is_safe(c) { c } else { '_' })
            .collect();
        let digest = Sha256::digest(production_id.as_bytes());
        format!("{sanitized}{DIGEST_MARKER}{}", hex::encode(&digest[..DIGEST_BYTES]))
    }

    /// Recover the production id a checkpoint file belongs to
    async fn stored_id(&self, path: &Path, stem: &str) -> Option<String> {
        if !stem.contains(DIGEST_MARKER) {
            return Some(stem.to_string());
        }

        let record = fs::read(path)
            .await
            .ok()
            .and_then(|payload| serde_json::from_slice::<CheckpointRecord>(&payload).ok());
        match record {
            Some(record) => Some(record.production_id().to_string()),
            None => {
                warn!(path = %path.display(), "Skipping unreadable checkpoint record");
                None
            }
        }
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    fn location(&self, production_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}{CHECKPOINT_SUFFIX}", Self::file_stem(production_id)))
    }

    async fn save(&self, record: &CheckpointRecord) -> CheckpointResult<PathBuf> {
        let path = self.location(record.production_id());
        let payload = serde_json::to_vec_pretty(record)?;

        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| CheckpointError::io(&self.directory, e))?;

        // Write then rename so a crash never leaves a truncated record behind
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, &payload)
            .await
            .map_err(|e| CheckpointError::io(&staging, e))?;
        fs::rename(&staging, &path)
            .await
            .map_err(|e| CheckpointError::io(&path, e))?;

        debug!(
            production_id = %record.production_id(),
            path = %path.display(),
            bytes = payload.len(),
            "Checkpoint written"
        );

        Ok(path)
    }

    async fn load(&self, production_id: &str) -> CheckpointResult<Option<CheckpointRecord>> {
        let path = self.location(production_id);
        let payload = match fs::read(&path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::io(&path, e)),
        };

        let location = path.display().to_string();
        let record: CheckpointRecord = serde_json::from_slice(&payload)
            .map_err(|e| CheckpointError::invalid(location.clone(), e.to_string()))?;
        record.verify(production_id, &location)?;
        Ok(Some(record))
    }

    async fn remove(&self, production_id: &str) -> CheckpointResult<bool> {
        let path = self.location(production_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CheckpointError::io(&path, e)),
        }
    }

    async fn list(&self) -> CheckpointResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CheckpointError::io(&self.directory, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CheckpointError::io(&self.directory, e))?
        {
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(CHECKPOINT_SUFFIX))
            else {
                continue;
            };
            if let Some(id) = self.stored_id(&entry.path(), stem).await {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::{ExecutionPhase, ExecutionState, RunEvent};
    use uuid::Uuid;

    fn sample_state() -> ExecutionState {
        let mut state = ExecutionState::new("night-drive");
        state.transition(RunEvent::Start).unwrap();
        for _ in 0..4 {
            state.advance_phase().unwrap();
        }
        state.complete_shot(0).unwrap();
        state.complete_shot(1).unwrap();
        state.complete_shot(2).unwrap();
        state.fail_shot(3).unwrap();
        state.current_shot = 4;
        state.record_progress(56.25).unwrap();
        state
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        let mut state = sample_state();
        state.checkpoint_path = Some(store.location("night-drive"));
        let record = CheckpointRecord::new(state.clone(), "productions/night-drive.yaml", Uuid::new_v4());

        let path = store.save(&record).await.unwrap();
        assert!(path.ends_with("night-drive.checkpoint.json"));

        let loaded = store.load("night-drive").await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.state.current_phase, ExecutionPhase::Shots);
        assert_eq!(loaded.state, state);
    }

    #[tokio::test]
    async fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path().join("never-created"));
        assert!(store.load("night-drive").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.remove("night-drive").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        std::fs::write(store.location("night-drive"), b"{ not json").unwrap();

        assert!(matches!(
            store.load("night-drive").await,
            Err(CheckpointError::InvalidRecord { .. })
        ));
    }

    #[tokio::test]
    async fn test_unwritable_directory_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"a file, not a directory").unwrap();
        let store = FileCheckpointStore::new(&blocker);
        let record = CheckpointRecord::new(sample_state(), "inline:night-drive", Uuid::new_v4());

        assert!(matches!(
            store.save(&record).await,
            Err(CheckpointError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        for id in ["teaser", "night-drive"] {
            let record = CheckpointRecord::new(ExecutionState::new(id), "inline", Uuid::new_v4());
            store.save(&record).await.unwrap();
        }

        assert_eq!(store.list().await.unwrap(), vec!["night-drive", "teaser"]);
        assert!(store.remove("teaser").await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec!["night-drive"]);
    }

    #[test]
    fn test_production_ids_are_made_file_safe() {
        let store = FileCheckpointStore::new("/var/checkpoints");
        assert_eq!(
            store.location("night-drive.v2"),
            PathBuf::from("/var/checkpoints/night-drive.v2.checkpoint.json")
        );

        let name = store.location("studio/ep 01");
        let name = name.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("studio_ep_01~"));
        assert!(name.ends_with(CHECKPOINT_SUFFIX));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_sanitized_ids_get_distinct_files() {
        let store = FileCheckpointStore::new("/var/checkpoints");
        let ids = ["studio/ep1", "studio_ep1", "studio ep1", "studio~ep1", ""];
        let locations: std::collections::HashSet<PathBuf> =
            ids.iter().map(|id| store.location(id)).collect();
        assert_eq!(locations.len(), ids.len());
    }

    #[tokio::test]
    async fn test_similar_ids_keep_separate_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());

        let mut slashed = ExecutionState::new("studio/ep1");
        slashed.transition(RunEvent::Start).unwrap();
        slashed.complete_shot(0).unwrap();
        let underscored = ExecutionState::new("studio_ep1");

        store
            .save(&CheckpointRecord::new(slashed.clone(), "inline", Uuid::new_v4()))
            .await
            .unwrap();
        store
            .save(&CheckpointRecord::new(underscored.clone(), "inline", Uuid::new_v4()))
            .await
            .unwrap();

        let loaded = store.load("studio/ep1").await.unwrap().unwrap();
        assert_eq!(loaded.state, slashed);
        let loaded = store.load("studio_ep1").await.unwrap().unwrap();
        assert_eq!(loaded.state, underscored);
        assert_eq!(store.list().await.unwrap(), vec!["studio/ep1", "studio_ep1"]);

        assert!(store.remove("studio/ep1").await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec!["studio_ep1"]);
    }
}
