//! Request and result types of the synthesis bridge
//!
//! Results serialize to the single JSON line the bridge prints.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::ErrorKind;
use crate::engine::VoiceStatus;

/// Output file used when the caller does not name one
pub const DEFAULT_OUTPUT_PATH: &str = "output.wav";

/// A synthesis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak; must not be blank
    pub text: String,
    /// Registered voice to use; unknown ids fall back to the default voice
    #[serde(default)]
    pub voice_id: Option<String>,
    /// Sample recording that switches the engine into cloning mode
    #[serde(default)]
    pub custom_voice_path: Option<PathBuf>,
    /// Where the WAV file is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: None,
            custom_voice_path: None,
            output_path: default_output_path(),
        }
    }

    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    pub fn with_custom_voice(mut self, sample: impl Into<PathBuf>) -> Self {
        self.custom_voice_path = Some(sample.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}

/// Registered voice used for a successful request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    pub voice_id: String,
    pub display_name: String,
}

/// Outcome of a synthesis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub success: bool,
    /// Written audio; also set for the degraded placeholder
    pub file: Option<PathBuf>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Outcome of a list-voices request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVoicesResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voices: Option<BTreeMap<String, VoiceStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Failure outside any request, e.g. bad arguments or setup errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl FailureResponse {
    pub fn unexpected(error: impl std::fmt::Display, trace: Option<String>) -> Self {
        Self {
            success: false,
            message: format!("Unexpected error: {}", error),
            trace,
        }
    }
}
