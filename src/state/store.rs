//! Checkpoint store implementation
//!
//! Provides file-based checkpoint persistence with atomic writes.

use super::types::Checkpoints;
use crate::continuation::FeedContinuation;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Persists feed continuations between runs
#[derive(Debug)]
pub struct CheckpointStore {
    /// Path to the checkpoint file
    path: PathBuf,
    /// Current checkpoints (cached)
    checkpoints: Arc<RwLock<Checkpoints>>,
}

impl CheckpointStore {
    /// Create a store writing to `path`, starting empty
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            checkpoints: Arc::new(RwLock::new(Checkpoints::new())),
        }
    }

    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            checkpoints: Arc::new(RwLock::new(Checkpoints::new())),
        }
    }

    /// Open a store, loading existing checkpoints if the file is present
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(path);
        store.load().await?;
        Ok(store)
    }

    /// Reload checkpoints from file
    pub async fn load(&self) -> Result<()> {
        if self.is_in_memory() || !self.path.exists() {
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to read checkpoint file: {e}")))?;

        let loaded: Checkpoints = serde_json::from_str(&contents)
            .map_err(|e| Error::state(format!("Failed to parse checkpoint file: {e}")))?;

        *self.checkpoints.write().await = loaded;
        Ok(())
    }

    /// Write checkpoints to file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = {
            let checkpoints = self.checkpoints.read().await;
            serde_json::to_string_pretty(&*checkpoints)
                .map_err(|e| Error::state(format!("Failed to serialize checkpoints: {e}")))?
        };

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write checkpoint file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename checkpoint file: {e}")))?;

        Ok(())
    }

    /// Persist the position of a feed
    pub async fn save_continuation(&self, feed: &str, continuation: &FeedContinuation) -> Result<()> {
        let serialized = continuation.to_json()?;
        self.checkpoints.write().await.set(feed, serialized);
        self.save().await?;

        debug!(
            "Checkpointed feed {} at {:?}",
            feed,
            continuation.continuation()
        );
        Ok(())
    }

    /// Restore the position of a feed, checking it belongs to `container_id`
    pub async fn restore(&self, feed: &str, container_id: &str) -> Result<Option<FeedContinuation>> {
        let serialized = {
            let checkpoints = self.checkpoints.read().await;
            match checkpoints.get(feed) {
                Some(checkpoint) => checkpoint.continuation.clone(),
                None => return Ok(None),
            }
        };

        let continuation = FeedContinuation::parse(&serialized)
            .and_then(|continuation| {
                continuation.validate_container(container_id)?;
                Ok(continuation)
            })
            .map_err(|e| {
                if e.is_fatal_for_frontier() {
                    warn!("Checkpoint for feed {} cannot be resumed: {}", feed, e);
                }
                e
            })?;

        Ok(Some(continuation))
    }

    /// Drop the checkpoint of a single feed
    pub async fn remove(&self, feed: &str) -> Result<()> {
        self.checkpoints.write().await.feeds.remove(feed);
        self.save().await
    }

    /// Drop every checkpoint
    pub async fn clear(&self) -> Result<()> {
        *self.checkpoints.write().await = Checkpoints::new();
        self.save().await
    }

    /// Names of every checkpointed feed
    pub async fn feeds(&self) -> Vec<String> {
        self.checkpoints.read().await.feeds.keys().cloned().collect()
    }

    /// Export checkpoints as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let checkpoints = self.checkpoints.read().await;
        serde_json::to_string_pretty(&*checkpoints)
            .map_err(|e| Error::state(format!("Failed to serialize checkpoints: {e}")))
    }

    /// Get the checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

impl Clone for CheckpointStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            checkpoints: Arc::clone(&self.checkpoints),
        }
    }
}
