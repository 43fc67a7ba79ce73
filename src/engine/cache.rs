//! Engine cache
//!
//! Lazily builds one engine per voice id and serves it for the rest of the
//! process lifetime. Voices that are not given, or not registered, fall back
//! to the `"default"` engine built from the built-in model directory.
//!
//! The cache lock is held while an engine is being constructed, so two
//! callers asking for the same voice never build it twice.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{BridgeConfig, Device, DEFAULT_MODEL_DIR};
use crate::core::error::{panic_message, Result, TtsError};
use crate::registry::VoiceRegistry;
use super::backend::Backend;
use super::traits::SpeechEngine;

/// Reserved key of the fallback engine
pub const DEFAULT_VOICE_ID: &str = "default";

/// Display name of the synthetic default entry
pub const DEFAULT_VOICE_NAME: &str = "Default Voice";

/// Merged registry and cache view of one voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStatus {
    pub display_name: String,
    pub model_dir: PathBuf,
    /// Engine currently held by the cache
    pub loaded: bool,
    /// Model directory exists right now
    pub valid: bool,
}

struct LoadedEngines {
    /// Fallback engine, never evicted
    default: Option<Arc<dyn SpeechEngine>>,
    /// Engines for registered voices
    voices: LruCache<String, Arc<dyn SpeechEngine>>,
}

/// Lazily-populated engine cache keyed by voice id
pub struct EngineCache {
    registry: VoiceRegistry,
    backend: Backend,
    device: Device,
    builtin_model_dir: PathBuf,
    engines: Mutex<LoadedEngines>,
}

impl EngineCache {
    /// Create an unbounded cache on CPU with the built-in default model
    pub fn new(registry: VoiceRegistry, backend: Backend) -> Self {
        Self {
            registry,
            backend,
            device: Device::Cpu,
            builtin_model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            engines: Mutex::new(LoadedEngines {
                default: None,
                voices: LruCache::unbounded(),
            }),
        }
    }

    /// Create a cache from bridge configuration
    pub fn from_config(config: &BridgeConfig, registry: VoiceRegistry, backend: Backend) -> Self {
        let cache = Self::new(registry, backend)
            .with_device(config.engine.device)
            .with_default_model_dir(&config.default_model_dir);
        match config.engine.max_loaded_voices {
            Some(capacity) => cache.with_capacity(capacity),
            None => cache,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_default_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.builtin_model_dir = dir.into();
        self
    }

    /// Bound the engines kept for registered voices, evicting the least
    /// recently used. The default engine does not count toward the bound.
    pub fn with_capacity(self, capacity: usize) -> Self {
        let voices = match NonZeroUsize::new(capacity) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            engines: Mutex::new(LoadedEngines {
                default: None,
                voices,
            }),
            ..self
        }
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    /// Registry mutations do not invalidate engines already built.
    pub fn registry_mut(&mut self) -> &mut VoiceRegistry {
        &mut self.registry
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Model directory the default engine is (or would be) built from.
    ///
    /// A registered `"default"` voice takes precedence over the built-in
    /// directory. Fails when the built-in directory is an empty path.
    pub fn default_model_dir(&self) -> Result<PathBuf> {
        match self.registry.get(DEFAULT_VOICE_ID) {
            Some(voice) => Ok(voice.model_dir.clone()),
            None => std::path::absolute(&self.builtin_model_dir).map_err(|e| TtsError::Config {
                message: format!("Invalid default model directory: {}", e),
                path: Some(self.builtin_model_dir.clone()),
            }),
        }
    }

    /// Get the engine for `voice_id`, building it on first use
    pub fn resolve(&self, voice_id: Option<&str>) -> Result<Arc<dyn SpeechEngine>> {
        let registered = voice_id
            .filter(|id| !id.is_empty())
            .and_then(|id| self.registry.get(id).map(|voice| (id, voice)));

        match registered {
            Some((id, voice)) if id != DEFAULT_VOICE_ID => self.resolve_voice(id, &voice.model_dir),
            _ => {
                if let Some(id) = voice_id.filter(|id| !id.is_empty() && *id != DEFAULT_VOICE_ID) {
                    debug!("Voice '{}' not registered, using default", id);
                }
                self.resolve_default()
            }
        }
    }

    fn resolve_default(&self) -> Result<Arc<dyn SpeechEngine>> {
        let mut engines = self.lock("EngineCache::resolve_default");
        if let Some(engine) = &engines.default {
            return Ok(Arc::clone(engine));
        }

        let model_dir = self.default_model_dir()?;
        if !model_dir.exists() {
            return Err(TtsError::ModelNotFound {
                voice_id: DEFAULT_VOICE_ID.to_string(),
                path: model_dir,
            });
        }

        let engine = self.build(DEFAULT_VOICE_ID, &model_dir)?;
        engines.default = Some(Arc::clone(&engine));
        Ok(engine)
    }

    fn resolve_voice(&self, voice_id: &str, model_dir: &Path) -> Result<Arc<dyn SpeechEngine>> {
        let mut engines = self.lock("EngineCache::resolve_voice");
        if let Some(engine) = engines.voices.get(voice_id) {
            return Ok(Arc::clone(engine));
        }

        if !model_dir.exists() {
            return Err(TtsError::ModelNotFound {
                voice_id: voice_id.to_string(),
                path: model_dir.to_path_buf(),
            });
        }

        let engine = self.build(voice_id, model_dir)?;
        if let Some((evicted, _)) = engines.voices.push(voice_id.to_string(), Arc::clone(&engine)) {
            info!("Evicted engine for voice '{}'", evicted);
        }
        Ok(engine)
    }

    fn build(&self, voice_id: &str, model_dir: &Path) -> Result<Arc<dyn SpeechEngine>> {
        let loader = match &self.backend {
            Backend::Available(loader) => loader,
            Backend::Unavailable { reason } => {
                return Err(TtsError::IntegrationUnavailable {
                    reason: reason.clone(),
                })
            }
        };

        info!("Loading engine for voice '{}' from {:?} on {}", voice_id, model_dir, self.device);
        let start = Instant::now();

        let loaded = panic::catch_unwind(AssertUnwindSafe(|| loader.load(model_dir, self.device)))
            .map_err(|payload| TtsError::EngineLoad {
                voice_id: voice_id.to_string(),
                message: format!("loader panicked: {}", panic_message(payload.as_ref())),
                path: model_dir.to_path_buf(),
            })?;

        let engine = loaded.map_err(|e| match e {
            TtsError::EngineLoad { message, path, .. } => TtsError::EngineLoad {
                voice_id: voice_id.to_string(),
                message,
                path,
            },
            other => TtsError::EngineLoad {
                voice_id: voice_id.to_string(),
                message: other.to_string(),
                path: model_dir.to_path_buf(),
            },
        })?;

        info!("Engine for voice '{}' loaded in {:.1}s", voice_id, start.elapsed().as_secs_f32());
        Ok(Arc::from(engine))
    }

    /// Whether an engine for `voice_id` is currently held
    pub fn is_loaded(&self, voice_id: &str) -> bool {
        Self::holds(&self.lock("EngineCache::is_loaded"), voice_id)
    }

    /// Number of engines currently held, default included
    pub fn loaded_count(&self) -> usize {
        let engines = self.lock("EngineCache::loaded_count");
        engines.voices.len() + usize::from(engines.default.is_some())
    }

    /// Every registered voice plus the default entry, with cache and
    /// filesystem state
    pub fn describe_all(&self) -> Result<BTreeMap<String, VoiceStatus>> {
        let engines = self.lock("EngineCache::describe_all");

        let mut result: BTreeMap<String, VoiceStatus> = self
            .registry
            .list()
            .iter()
            .map(|(id, voice)| {
                let status = VoiceStatus {
                    display_name: voice.display_name.clone(),
                    model_dir: voice.model_dir.clone(),
                    loaded: Self::holds(&engines, id),
                    valid: voice.model_dir_exists(),
                };
                (id.clone(), status)
            })
            .collect();

        if !result.contains_key(DEFAULT_VOICE_ID) {
            let model_dir = self.default_model_dir()?;
            result.insert(
                DEFAULT_VOICE_ID.to_string(),
                VoiceStatus {
                    display_name: DEFAULT_VOICE_NAME.to_string(),
                    valid: model_dir.exists(),
                    model_dir,
                    loaded: engines.default.is_some(),
                },
            );
        }

        Ok(result)
    }

    fn holds(engines: &LoadedEngines, voice_id: &str) -> bool {
        if voice_id == DEFAULT_VOICE_ID {
            engines.default.is_some()
        } else {
            engines.voices.contains(voice_id)
        }
    }

    /// Entries are only inserted after a successful build, so a guard left
    /// behind by a panicking holder is still consistent.
    fn lock(&self, location: &str) -> MutexGuard<'_, LoadedEngines> {
        self.engines.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Engine cache lock poisoned at {}, recovering", location);
            poisoned.into_inner()
        })
    }
}
