//! Bridge configuration
//!
//! Settings are read from an optional TOML file. Every field has a default,
//! so a missing file (or a partial one) is valid.
//!
//! ```toml
//! registry_path = "config/voice_registry.json"
//! default_model_dir = "pretrained_models/Spark-TTS-0.5B"
//!
//! [engine]
//! command = "spark-tts-infer"
//! device = "cuda:0"
//! max_loaded_voices = 4
//! ```

mod device;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TtsError};

pub use device::Device;

/// Default location of the voice registry document
pub const DEFAULT_REGISTRY_PATH: &str = "config/voice_registry.json";

/// Built-in model used for the fallback voice
pub const DEFAULT_MODEL_DIR: &str = "pretrained_models/Spark-TTS-0.5B";

/// Diagnostic log overwritten on each failed request
pub const DEFAULT_ERROR_LOG: &str = "tts_error.log";

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "voice-bridge.toml";

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Voice registry JSON document
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    /// Model directory for the fallback "default" voice
    #[serde(default = "default_model_dir")]
    pub default_model_dir: PathBuf,
    /// Diagnostic log file written on failure
    #[serde(default = "default_error_log_path")]
    pub error_log_path: PathBuf,
    /// Sample rate of written audio
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Characters of trace kept in structured results
    #[serde(default = "default_trace_limit")]
    pub trace_limit: usize,
    /// Inference integration settings
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Inference integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// External inference program; unset means no integration is available
    #[serde(default)]
    pub command: Option<PathBuf>,
    /// Extra arguments passed before the per-request flags
    #[serde(default)]
    pub args: Vec<String>,
    /// Device engines are bound to
    #[serde(default)]
    pub device: Device,
    /// Files a model directory must contain to be loadable
    #[serde(default = "default_required_files")]
    pub required_files: Vec<String>,
    /// Upper bound on engines kept for registered voices (None = unbounded)
    #[serde(default)]
    pub max_loaded_voices: Option<usize>,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY_PATH)
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_DIR)
}

fn default_error_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_ERROR_LOG)
}

fn default_sample_rate() -> u32 {
    crate::DEFAULT_SAMPLE_RATE
}

fn default_trace_limit() -> usize {
    200
}

fn default_required_files() -> Vec<String> {
    vec!["config.yaml".to_string()]
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            device: Device::default(),
            required_files: default_required_files(),
            max_loaded_voices: None,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            default_model_dir: default_model_dir(),
            error_log_path: default_error_log_path(),
            sample_rate: default_sample_rate(),
            trace_limit: default_trace_limit(),
            engine: EngineSettings::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| TtsError::Io {
            message: format!("Failed to read config file: {}", e),
            path: Some(path.as_ref().to_path_buf()),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| TtsError::Config {
            message: format!("Failed to parse config file: {}", e),
            path: Some(path.as_ref().to_path_buf()),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| TtsError::Config {
            message: format!("Failed to serialize config: {}", e),
            path: None,
        })?;

        std::fs::write(path.as_ref(), content).map_err(|e| TtsError::Io {
            message: format!("Failed to write config file: {}", e),
            path: Some(path.as_ref().to_path_buf()),
        })?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(TtsError::Config {
                message: "sample_rate must be greater than zero".to_string(),
                path: None,
            });
        }
        if self.engine.max_loaded_voices == Some(0) {
            return Err(TtsError::Config {
                message: "engine.max_loaded_voices must be at least 1 when set".to_string(),
                path: None,
            });
        }
        Ok(())
    }
}
