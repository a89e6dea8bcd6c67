use tracing::{debug, warn};

use crate::core::message::Message;
use crate::core::storage::{SnapshotStorage, StorageError};

pub const DEFAULT_CONVERSATION_KEY: &str = "chatHistory";

/// Persists the whole conversation as one JSON snapshot under a fixed key.
///
/// Every save overwrites the previous snapshot; there are no incremental
/// writes. Loading never fails: a missing or unreadable snapshot is an empty
/// conversation.
pub struct ConversationStore<S> {
    storage: S,
    key: String,
}

impl<S: SnapshotStorage> ConversationStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> Vec<Message> {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "conversation snapshot unreadable");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => {
                debug!(key = %self.key, count = messages.len(), "loaded conversation");
                messages
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding malformed conversation snapshot");
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, messages: &[Message]) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(messages).map_err(StorageError::Encode)?;
        self.storage.write(&self.key, &snapshot)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }
}
