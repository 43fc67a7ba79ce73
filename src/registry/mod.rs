//! Voice Registry
//!
//! Durable mapping from voice id to model location and display name, backed
//! by a single JSON document:
//!
//! ```json
//! {
//!   "narrator": {
//!     "model_dir": "models/narrator",
//!     "display_name": "Narrator"
//!   }
//! }
//! ```
//!
//! The document is read once when the registry is opened and rewritten in
//! full after every mutation. Writes go through a temporary file in the same
//! directory followed by a rename, so a reader never observes a half-written
//! document. There is no locking between processes: the last writer wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::core::error::{Result, TtsError};

/// A registered voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Directory holding the model assets
    pub model_dir: PathBuf,
    /// Human-readable label
    pub display_name: String,
}

impl Voice {
    pub fn new(model_dir: impl Into<PathBuf>, display_name: impl Into<String>) -> Self {
        Self {
            model_dir: model_dir.into(),
            display_name: display_name.into(),
        }
    }

    /// Live existence check of the model directory
    pub fn model_dir_exists(&self) -> bool {
        self.model_dir.exists()
    }
}

/// Voice registry backed by a JSON document
#[derive(Debug)]
pub struct VoiceRegistry {
    /// Backing document
    path: PathBuf,
    /// In-memory source of truth, keyed by voice id
    voices: BTreeMap<String, Voice>,
}

impl VoiceRegistry {
    /// Open the registry at `path`. A missing document is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let voices = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| TtsError::Registry {
                message: format!("Failed to read registry: {}", e),
                path: path.clone(),
            })?;
            serde_json::from_str(&content).map_err(|e| TtsError::Registry {
                message: format!("Failed to parse registry: {}", e),
                path: path.clone(),
            })?
        } else {
            debug!("No registry at {:?}, starting empty", path);
            BTreeMap::new()
        };

        debug!("Loaded {} voice(s) from {:?}", voices.len(), path);
        Ok(Self { path, voices })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite `voice_id`, then persist.
    ///
    /// `model_dir` is not checked here; use [`VoiceRegistry::validate`].
    pub fn add_or_update(
        &mut self,
        voice_id: &str,
        model_dir: impl Into<PathBuf>,
        display_name: impl Into<String>,
    ) -> Result<()> {
        self.voices
            .insert(voice_id.to_string(), Voice::new(model_dir, display_name));
        self.save()?;
        info!("Voice '{}' added/updated", voice_id);
        Ok(())
    }

    /// Remove `voice_id`. Returns whether an entry was deleted.
    pub fn remove(&mut self, voice_id: &str) -> Result<bool> {
        if self.voices.remove(voice_id).is_none() {
            return Ok(false);
        }
        self.save()?;
        info!("Voice '{}' removed", voice_id);
        Ok(true)
    }

    /// Look up a voice
    pub fn get(&self, voice_id: &str) -> Option<&Voice> {
        self.voices.get(voice_id)
    }

    pub fn contains(&self, voice_id: &str) -> bool {
        self.voices.contains_key(voice_id)
    }

    /// All registered voices, ordered by id
    pub fn list(&self) -> &BTreeMap<String, Voice> {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// True iff the voice exists and its model directory exists right now
    pub fn validate(&self, voice_id: &str) -> bool {
        self.get(voice_id).is_some_and(Voice::model_dir_exists)
    }

    /// Rewrite the whole document
    fn save(&self) -> Result<()> {
        let registry_err = |message: String| TtsError::Registry {
            message,
            path: self.path.clone(),
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| registry_err(format!("Failed to create registry directory: {}", e)))?;

        let content = serde_json::to_string_pretty(&self.voices)
            .map_err(|e| registry_err(format!("Failed to serialize registry: {}", e)))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| registry_err(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| registry_err(format!("Failed to write registry: {}", e)))?;
        tmp.persist(&self.path)
            .map_err(|e| registry_err(format!("Failed to replace registry: {}", e.error)))?;

        debug!("Saved {} voice(s) to {:?}", self.voices.len(), self.path);
        Ok(())
    }
}
