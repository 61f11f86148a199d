//! Append-only document storage behind the submission endpoint.
//!
//! Writes are server-authoritative: the store assigns the document id and
//! the timestamp, callers only provide the payload fields.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dogmail_core::utils::config::{ServerSettings, StorageBackend};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

/// Collection receiving submitted addresses
pub const EMAILS_COLLECTION: &str = "emails";

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Fields,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends one document; resolves once it is durable for this backend.
    async fn append(&self, collection: &str, fields: Fields) -> Result<StoredDocument, PersistenceError>;
}

fn new_document(fields: Fields) -> StoredDocument {
    StoredDocument {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        fields,
    }
}

fn check_collection(collection: &str) -> Result<(), PersistenceError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidCollection(collection.to_string()))
    }
}

/// In-process store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        let collections = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        collections.get(collection).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn append(&self, collection: &str, fields: Fields) -> Result<StoredDocument, PersistenceError> {
        check_collection(collection)?;
        let document = new_document(fields);
        let mut collections = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }
}

/// One JSON document per line in `<dir>/<collection>.jsonl`.
#[derive(Debug)]
pub struct JsonlStore {
    dir: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlStore {
    /// Opens the store, creating `dir` when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened jsonl store");
        Ok(Self {
            dir,
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.jsonl"))
    }

    /// Reads back every document of `collection`; empty when never written.
    pub async fn load(&self, collection: &str) -> Result<Vec<StoredDocument>, PersistenceError> {
        check_collection(collection)?;
        let content = match tokio::fs::read_to_string(self.collection_path(collection)).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(PersistenceError::from))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for JsonlStore {
    async fn append(&self, collection: &str, fields: Fields) -> Result<StoredDocument, PersistenceError> {
        check_collection(collection)?;
        let document = new_document(fields);
        let mut line = serde_json::to_vec(&document)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.collection_path(collection))
            .await?;
        file.write_all(&line).await?;
        file.sync_data().await?;

        Ok(document)
    }
}

/// Builds the backend selected in the server settings.
pub fn open_store(settings: &ServerSettings) -> Result<Arc<dyn DocumentStore>, PersistenceError> {
    match settings.storage {
        StorageBackend::Memory => {
            info!("using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Jsonl => {
            info!(data_dir = %settings.data_dir, "using jsonl document store");
            Ok(Arc::new(JsonlStore::open(&settings.data_dir)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn email_fields(email: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("email".to_string(), json!(email));
        fields
    }

    #[tokio::test]
    async fn test_memory_store_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let before = Utc::now();

        let first = store.append(EMAILS_COLLECTION, email_fields("a@b.co")).await.unwrap();
        let second = store.append(EMAILS_COLLECTION, email_fields("a@b.co")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.timestamp >= before);
        assert_eq!(store.documents(EMAILS_COLLECTION), vec![first, second]);
        assert!(store.documents("other").is_empty());
    }

    #[tokio::test]
    async fn test_jsonl_store_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path().join("data")).unwrap();

        let first = store.append(EMAILS_COLLECTION, email_fields("one@example.com")).await.unwrap();
        let second = store.append(EMAILS_COLLECTION, email_fields("two@example.com")).await.unwrap();

        let raw = std::fs::read_to_string(store.collection_path(EMAILS_COLLECTION)).unwrap();
        assert_eq!(raw.lines().count(), 2);
        let line: Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
        assert_eq!(line["email"], json!("one@example.com"));
        assert_eq!(line["id"], json!(first.id.to_string()));
        assert!(line.get("timestamp").is_some());

        assert_eq!(store.load(EMAILS_COLLECTION).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_jsonl_load_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        assert!(store.load(EMAILS_COLLECTION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collection_names_cannot_escape_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();

        let err = store.append("../emails", email_fields("a@b.co")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidCollection(_)));
        assert!(MemoryStore::new().append("", Fields::new()).await.is_err());
    }

    #[test]
    fn test_open_store_follows_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ServerSettings {
            data_dir: dir.path().join("nested").to_string_lossy().into_owned(),
            storage: StorageBackend::Jsonl,
            ..Default::default()
        };

        assert!(open_store(&settings).is_ok());
        assert!(dir.path().join("nested").is_dir());
    }
}
