use crate::errors::StoreError;
use crate::types::db::{Project, User};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The whole persisted state: one JSON document with two top-level lists.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Flat-file JSON datastore. Every mutation is a whole-document
/// read-modify-write; there is no locking and no transaction isolation, which
/// mirrors the read-modify-write granularity this system is specified with.
#[derive(Debug, Clone)]
pub struct Datastore {
    path: PathBuf,
}

impl Datastore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One-time startup initialization, run before the listener binds.
    /// Creates an empty document when the file is missing and rewrites an
    /// existing one so that missing top-level lists are backfilled.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let exists = tokio::fs::try_exists(&self.path).await.map_err(|source| {
            StoreError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        if !exists {
            tracing::info!(path = %self.path.display(), "creating new datastore document");
            self.write(&Document::default()).await?;
            return Ok(());
        }

        // Deserializing fills defaulted lists; writing back persists them.
        let document = self.read().await?;
        self.write(&document).await
    }

    pub async fn read(&self) -> Result<Document, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn write(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
