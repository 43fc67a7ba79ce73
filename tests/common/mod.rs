//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use voice_bridge::config::Device;
use voice_bridge::{
    Backend, EngineCache, EngineLoader, InferenceOptions, ProcessorSettings, RequestProcessor,
    Result, SpeechEngine, TtsError, VoiceRegistry,
};

/// Marker file that makes [`ToneLoader`] refuse a model directory
pub const BROKEN_MARKER: &str = "BROKEN";

/// Marker file that makes [`ToneLoader`] panic while loading
pub const PANIC_MARKER: &str = "PANIC";

/// Text that makes [`ToneEngine`] panic
pub const PANIC_TEXT: &str = "please panic";

/// Engine producing a short 440 Hz tone
pub struct ToneEngine {
    model_dir: PathBuf,
    calls: Arc<Mutex<Vec<InferenceOptions>>>,
}

impl SpeechEngine for ToneEngine {
    fn inference(&self, text: &str, options: &InferenceOptions) -> Result<Vec<f32>> {
        if text == PANIC_TEXT {
            panic!("tone engine asked to panic");
        }
        self.calls.lock().unwrap().push(options.clone());
        Ok((0..1600)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16000.0).sin() * 0.3)
            .collect())
    }

    fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

/// Loader that counts constructions
#[derive(Clone, Default)]
pub struct ToneLoader {
    pub loads: Arc<AtomicUsize>,
    pub calls: Arc<Mutex<Vec<InferenceOptions>>>,
}

impl EngineLoader for ToneLoader {
    fn name(&self) -> &str {
        "tone"
    }

    fn load(&self, model_dir: &Path, _device: Device) -> Result<Box<dyn SpeechEngine>> {
        if model_dir.join(PANIC_MARKER).exists() {
            panic!("tone loader asked to panic");
        }
        if model_dir.join(BROKEN_MARKER).exists() {
            return Err(TtsError::EngineLoad {
                voice_id: String::new(),
                message: "malformed model assets".to_string(),
                path: model_dir.to_path_buf(),
            });
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ToneEngine {
            model_dir: model_dir.to_path_buf(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

/// Temporary workspace with a built-in model dir, registry path and log path
pub struct Fixture {
    pub dir: TempDir,
    pub loader: ToneLoader,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
            loader: ToneLoader::default(),
        };
        std::fs::create_dir_all(fixture.builtin_dir()).unwrap();
        fixture
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn builtin_dir(&self) -> PathBuf {
        self.path("pretrained_models/Spark-TTS-0.5B")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.path("config/voice_registry.json")
    }

    pub fn error_log(&self) -> PathBuf {
        self.path("tts_error.log")
    }

    /// Create a model directory and return its path
    pub fn model_dir(&self, name: &str) -> PathBuf {
        let dir = self.path(&format!("models/{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn registry(&self) -> VoiceRegistry {
        VoiceRegistry::open(self.registry_path()).unwrap()
    }

    pub fn loads(&self) -> usize {
        self.loader.loads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<InferenceOptions> {
        self.loader.calls.lock().unwrap().clone()
    }

    pub fn cache(&self) -> EngineCache {
        self.cache_with(Backend::available(self.loader.clone()))
    }

    pub fn cache_with(&self, backend: Backend) -> EngineCache {
        EngineCache::new(self.registry(), backend).with_default_model_dir(self.builtin_dir())
    }

    pub fn settings(&self) -> ProcessorSettings {
        ProcessorSettings {
            error_log_path: self.error_log(),
            ..ProcessorSettings::default()
        }
    }

    pub fn processor(&self) -> RequestProcessor {
        RequestProcessor::new(self.cache(), self.settings())
    }

    pub fn processor_with(&self, backend: Backend) -> RequestProcessor {
        RequestProcessor::new(self.cache_with(backend), self.settings())
    }
}

/// Whether two handles point at the same engine instance
pub fn same_engine(a: &Arc<dyn SpeechEngine>, b: &Arc<dyn SpeechEngine>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
