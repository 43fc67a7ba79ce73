//! Core traits for the inference integration
//!
//! The neural model is opaque to the bridge: an engine is built from a model
//! directory by an [`EngineLoader`] and exposes a single blocking
//! [`SpeechEngine::inference`] call.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Device;
use crate::core::error::Result;

/// Reference transcript passed along with a cloning sample
pub const CLONE_PROMPT_TEXT: &str = "This is a sample voice.";

/// A loaded inference engine bound to one model directory and device
pub trait SpeechEngine: Send + Sync {
    /// Generate mono samples normalized to [-1, 1]
    fn inference(&self, text: &str, options: &InferenceOptions) -> Result<Vec<f32>>;

    /// Model directory this engine was built from
    fn model_dir(&self) -> &Path;
}

/// Builds engines. Construction is expected to be expensive.
pub trait EngineLoader: Send + Sync {
    /// Integration name for logs
    fn name(&self) -> &str;

    /// Build an engine for `model_dir` on `device`
    fn load(&self, model_dir: &Path, device: Device) -> Result<Box<dyn SpeechEngine>>;
}

/// How the engine should shape the voice
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOptions {
    /// Zero-shot cloning from a sample recording
    Clone {
        prompt_speech_path: PathBuf,
        prompt_text: String,
    },
    /// Parametric voice from generation controls
    Control {
        gender: Gender,
        pitch: Level,
        speed: Level,
    },
}

impl InferenceOptions {
    /// Cloning mode with the fixed reference transcript
    pub fn from_sample(sample: impl Into<PathBuf>) -> Self {
        InferenceOptions::Clone {
            prompt_speech_path: sample.into(),
            prompt_text: CLONE_PROMPT_TEXT.to_string(),
        }
    }

    pub fn is_clone(&self) -> bool {
        matches!(self, InferenceOptions::Clone { .. })
    }
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions::Control {
            gender: Gender::Male,
            pitch: Level::Moderate,
            speed: Level::Moderate,
        }
    }
}

/// Speaker gender control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Five-step level used for pitch and speed controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::VeryLow => write!(f, "very_low"),
            Level::Low => write!(f, "low"),
            Level::Moderate => write!(f, "moderate"),
            Level::High => write!(f, "high"),
            Level::VeryHigh => write!(f, "very_high"),
        }
    }
}
