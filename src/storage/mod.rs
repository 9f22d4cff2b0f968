//! Output directory writer
//!
//! Documents are serialized fully in memory, written to a temporary sibling
//! file and renamed over the target, so readers never observe a partial file.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to serialize {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after a write
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    pub path: PathBuf,
    pub size: usize,
}

/// Writes whole JSON documents into one directory
#[derive(Debug, Clone)]
pub struct FeedStorage {
    dir: PathBuf,
}

impl FeedStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Serialize `document` as pretty JSON and atomically replace `name`
    pub async fn write_json<T: Serialize>(&self, name: &str, document: &T) -> Result<WriteMetadata> {
        let mut body = serde_json::to_vec_pretty(document).map_err(|source| {
            StorageError::Serialize {
                name: name.to_string(),
                source,
            }
        })?;
        body.push(b'\n');

        let path = self.path_for(name);
        let tmp_path = self.dir.join(format!(".{name}.tmp"));
        let size = body.len();

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_error(&self.dir))?;
        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(write_error(&tmp_path))?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_error(&path)(e));
        }

        tracing::info!(path = %path.display(), size, "Wrote document");

        Ok(WriteMetadata { path, size })
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Write { path, source }
}
