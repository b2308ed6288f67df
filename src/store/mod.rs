//! Typed persistence over a durable key-value backend.
//!
//! Two logical keys are used:
//!
//! | Key | Value | Default |
//! |---|---|---|
//! | `selectedCharacters` | JSON array of character records | `[]` |
//! | `currentProgress` | JSON integer, simple-mode cursor | `0` |
//!
//! Reads never fail: an absent key, a malformed value or a backend error all
//! fall back to the default. Typed writes are fire-and-forget and only log on
//! failure.

pub mod backend;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::Character;

pub const SELECTED_CHARACTERS_KEY: &str = "selectedCharacters";
pub const CURRENT_PROGRESS_KEY: &str = "currentProgress";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub struct Store<B> {
    backend: B,
}

impl<B: KeyValueBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and decode `key`, or `None` if it is absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read '{key}' from storage: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring malformed value for '{key}': {e}");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.backend.write(key, &raw)
    }

    pub fn selected_characters(&self) -> Vec<Character> {
        self.get(SELECTED_CHARACTERS_KEY).unwrap_or_default()
    }

    pub fn save_selected_characters(&mut self, characters: &[Character]) {
        if let Err(e) = self.set(SELECTED_CHARACTERS_KEY, characters) {
            log::warn!("Failed to save selection: {e}");
        }
    }

    /// Forget the saved selection. Reads fall back to `[]` afterwards.
    pub fn clear_selected_characters(&mut self) {
        if let Err(e) = self.backend.remove(SELECTED_CHARACTERS_KEY) {
            log::warn!("Failed to clear selection: {e}");
        }
    }

    pub fn current_progress(&self) -> usize {
        self.get(CURRENT_PROGRESS_KEY).unwrap_or(0)
    }

    pub fn save_progress(&mut self, index: usize) {
        if let Err(e) = self.set(CURRENT_PROGRESS_KEY, &index) {
            log::warn!("Failed to save progress: {e}");
        }
    }
}
