use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use inboxpilot_core::domain::draft::DraftId;
use inboxpilot_core::errors::ApplicationError;

pub const EMAILS_FILE: &str = "emails.json";
pub const PROMPTS_FILE: &str = "prompts.json";
pub const DRAFTS_FILE: &str = "drafts.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not decode `{path}`: {source}")]
    Decode { path: PathBuf, source: serde_json::Error },
    #[error("could not encode `{path}`: {source}")]
    Encode { path: PathBuf, source: serde_json::Error },
    #[error("could not write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("draft {0} does not exist")]
    DraftNotFound(DraftId),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Read { .. } | StoreError::Decode { .. } | StoreError::DraftNotFound(_) => {
                Self::StorageRead(value.to_string())
            }
            StoreError::Encode { .. } | StoreError::Write { .. } => {
                Self::StorageWrite(value.to_string())
            }
        }
    }
}

/// Flat-file persistence for the three record collections. Every save
/// rewrites the whole document; the last writer wins.
#[derive(Clone, Debug)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub(crate) fn path_for(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Reads a document, returning `Ok(None)` when it does not exist.
    pub(crate) async fn read_document<T>(&self, file_name: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = self.path_for(file_name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        serde_json::from_str(&raw).map(Some).map_err(|source| StoreError::Decode { path, source })
    }

    /// Like `read_document`, but any failure degrades to `T::default()`.
    pub(crate) async fn read_or_default<T>(&self, file_name: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.read_document(file_name).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(
                    event_name = "store.load.missing",
                    file = file_name,
                    "document does not exist yet, using empty collection"
                );
                T::default()
            }
            Err(error) => {
                warn!(
                    event_name = "store.load.failed",
                    file = file_name,
                    error = %error,
                    "falling back to empty collection"
                );
                T::default()
            }
        }
    }

    pub(crate) async fn write_document<T>(&self, file_name: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let path = self.path_for(file_name);
        let encoded = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Encode { path: path.clone(), source })?;

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| StoreError::Write { path: self.data_dir.clone(), source })?;

        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded)
            .await
            .map_err(|source| StoreError::Write { path: staging.clone(), source })?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|source| StoreError::Write { path: path.clone(), source })?;

        debug!(event_name = "store.save.completed", file = file_name, "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{JsonStore, StoreError};

    #[tokio::test]
    async fn missing_document_reads_as_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonStore::new(dir.path());

        let value: Option<Vec<String>> =
            store.read_document("absent.json").await.expect("missing file is not an error");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn corrupt_document_is_a_decode_error_but_defaults_on_load() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("broken.json"), "{not json").expect("write fixture");
        let store = JsonStore::new(dir.path());

        let result = store.read_document::<Vec<String>>("broken.json").await;
        assert!(matches!(result, Err(StoreError::Decode { .. })));

        let fallback: Vec<String> = store.read_or_default("broken.json").await;
        assert!(fallback.is_empty());
    }

    #[tokio::test]
    async fn write_creates_data_dir() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonStore::new(dir.path().join("nested"));

        store.write_document("list.json", &vec!["a", "b"]).await.expect("write succeeds");
        let value: Option<Vec<String>> = store.read_document("list.json").await.expect("read");

        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }
}
