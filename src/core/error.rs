//! Structured error handling for the voice bridge
//!
//! Every failure the bridge can report is a variant of [`TtsError`].
//! Callers that need to branch on the failure class use [`TtsError::kind`]
//! rather than matching on message text.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias with TtsError
pub type Result<T> = std::result::Result<T, TtsError>;

/// Main error type for the voice bridge
#[derive(Error, Debug, Clone)]
pub enum TtsError {
    /// Required request input missing or malformed
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        field: Option<String>,
    },

    /// Configured model directory does not exist
    #[error("Model directory for voice '{voice_id}' not found: {}", .path.display())]
    ModelNotFound {
        voice_id: String,
        path: PathBuf,
    },

    /// Model directory exists but the engine could not be built from it
    #[error("Failed to load model for voice '{voice_id}': {message}")]
    EngineLoad {
        voice_id: String,
        message: String,
        path: PathBuf,
    },

    /// Input file (voice sample) missing
    #[error("Voice file not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
    },

    /// Synthesized audio was not present after writing
    #[error("Output file was not created: {} ({message})", .path.display())]
    OutputWrite {
        message: String,
        path: PathBuf,
    },

    /// The inference integration failed to initialize for this process
    #[error("Speech engine integration unavailable: {reason}")]
    IntegrationUnavailable {
        reason: String,
    },

    /// The engine failed while generating audio
    #[error("Inference error: {message}")]
    Inference {
        message: String,
    },

    /// Voice registry document could not be read or written
    #[error("Voice registry error ({}): {message}", .path.display())]
    Registry {
        message: String,
        path: PathBuf,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    /// Internal/bug errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        location: Option<String>,
    },
}

/// Coarse error classification exposed at the API boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    ModelNotFound,
    EngineLoad,
    FileNotFound,
    OutputWrite,
    IntegrationUnavailable,
    Inference,
    Registry,
    Config,
    Io,
    Internal,
}

impl ErrorKind {
    /// Kinds reported to callers as a missing file.
    pub fn is_file_not_found(self) -> bool {
        matches!(
            self,
            ErrorKind::ModelNotFound | ErrorKind::FileNotFound | ErrorKind::OutputWrite
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidRequest => "InvalidRequestError",
            ErrorKind::ModelNotFound => "ModelNotFoundError",
            ErrorKind::EngineLoad => "EngineLoadError",
            ErrorKind::FileNotFound => "FileNotFoundError",
            ErrorKind::OutputWrite => "OutputWriteError",
            ErrorKind::IntegrationUnavailable => "IntegrationUnavailableError",
            ErrorKind::Inference => "InferenceError",
            ErrorKind::Registry => "RegistryError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Io => "IoError",
            ErrorKind::Internal => "InternalError",
        };
        f.write_str(name)
    }
}

impl TtsError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TtsError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            TtsError::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            TtsError::EngineLoad { .. } => ErrorKind::EngineLoad,
            TtsError::FileNotFound { .. } => ErrorKind::FileNotFound,
            TtsError::OutputWrite { .. } => ErrorKind::OutputWrite,
            TtsError::IntegrationUnavailable { .. } => ErrorKind::IntegrationUnavailable,
            TtsError::Inference { .. } => ErrorKind::Inference,
            TtsError::Registry { .. } => ErrorKind::Registry,
            TtsError::Config { .. } => ErrorKind::Config,
            TtsError::Io { .. } => ErrorKind::Io,
            TtsError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

/// Best-effort text of a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add a simple message context
    fn context(self, msg: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| TtsError::Internal {
            message: format!("{}: {}", msg.into(), e),
            location: None,
        })
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for TtsError {
    fn from(err: std::io::Error) -> Self {
        TtsError::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

/// Convert from serde_json::Error
impl From<serde_json::Error> for TtsError {
    fn from(err: serde_json::Error) -> Self {
        TtsError::Internal {
            message: format!("JSON serialization failed: {}", err),
            location: None,
        }
    }
}

/// Convert from hound::Error
impl From<hound::Error> for TtsError {
    fn from(err: hound::Error) -> Self {
        TtsError::Io {
            message: format!("WAV I/O failed: {}", err),
            path: None,
        }
    }
}
