// TASKFORGE - File Storage
// The seam to the host platform's uploaded-content store

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("index error: {0}")]
    Index(#[from] serde_json::Error),
}

/// Read access to content the operator previously registered. The host
/// platform owns persistence and upload; the translation engine only ever
/// performs these three lookups, one task at a time, with no retries.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Content registered under a user-facing name.
    async fn content_by_name(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Content by its opaque identifier.
    async fn content_by_id(&self, file_id: &str) -> Result<Vec<u8>, StoreError>;

    /// The display name recorded for an opaque identifier.
    async fn filename_by_id(&self, file_id: &str) -> Result<String, StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
}

/// Directory-backed store: content lives in one file per identifier, and
/// `index.json` maps identifiers to their registered names.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(LocalFileStore { root })
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn load_index(&self) -> Result<Vec<FileRecord>, StoreError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_index(&self, records: &[FileRecord]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(records)?;
        fs::write(self.index_path(), content)?;
        Ok(())
    }

    fn record_by_id(&self, file_id: &str) -> Result<FileRecord, StoreError> {
        self.load_index()?
            .into_iter()
            .find(|r| r.id == file_id)
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))
    }

    /// Registers content under a name and returns the new opaque identifier.
    pub fn register(&self, name: &str, content: &[u8]) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        fs::write(self.root.join(&id), content)?;

        let mut records = self.load_index()?;
        records.push(FileRecord {
            id: id.clone(),
            name: name.to_string(),
        });
        self.save_index(&records)?;

        debug!("registered \"{name}\" as {id}");
        Ok(id)
    }

    pub fn records(&self) -> Result<Vec<FileRecord>, StoreError> {
        self.load_index()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn content_by_name(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let record = self
            .load_index()?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Ok(fs::read(self.root.join(&record.id))?)
    }

    async fn content_by_id(&self, file_id: &str) -> Result<Vec<u8>, StoreError> {
        let record = self.record_by_id(file_id)?;
        Ok(fs::read(self.root.join(&record.id))?)
    }

    async fn filename_by_id(&self, file_id: &str) -> Result<String, StoreError> {
        Ok(self.record_by_id(file_id)?.name)
    }
}

/// In-memory store used by the command tests; content is seeded directly
/// instead of going through registration.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: HashMap<String, (String, Vec<u8>)>,
}

#[cfg(test)]
impl MemoryFileStore {
    pub fn new() -> Self {
        MemoryFileStore::default()
    }

    pub fn insert(&mut self, file_id: &str, name: &str, content: &[u8]) {
        self.files
            .insert(file_id.to_string(), (name.to_string(), content.to_vec()));
    }
}

#[cfg(test)]
#[async_trait]
impl FileStore for MemoryFileStore {
    async fn content_by_name(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.files
            .values()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn content_by_id(&self, file_id: &str) -> Result<Vec<u8>, StoreError> {
        self.files
            .get(file_id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))
    }

    async fn filename_by_id(&self, file_id: &str) -> Result<String, StoreError> {
        self.files
            .get(file_id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| StoreError::NotFound(file_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("taskforge_store_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let root = temp_root();
        let store = LocalFileStore::open(&root).unwrap();

        let id = store.register("evil.dll", &[0x4d, 0x5a, 0x00]).unwrap();

        assert_eq!(
            store.content_by_name("evil.dll").await.unwrap(),
            vec![0x4d, 0x5a, 0x00]
        );
        assert_eq!(store.content_by_id(&id).await.unwrap(), vec![0x4d, 0x5a, 0x00]);
        assert_eq!(store.filename_by_id(&id).await.unwrap(), "evil.dll");

        fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_local_store_index_survives_reopen() {
        let root = temp_root();
        let id = {
            let store = LocalFileStore::open(&root).unwrap();
            store.register("tool.exe", b"binary").unwrap()
        };

        let store = LocalFileStore::open(&root).unwrap();
        assert_eq!(store.filename_by_id(&id).await.unwrap(), "tool.exe");
        assert_eq!(store.records().unwrap().len(), 1);

        fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_missing_content_is_not_found() {
        let mut store = MemoryFileStore::new();
        store.insert("id-1", "evil.dll", &[0x4d, 0x5a]);

        assert!(matches!(
            store.content_by_name("other.dll").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.content_by_id("id-2").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.content_by_name("evil.dll").await.unwrap(), vec![0x4d, 0x5a]);
    }
}
