//! Request processing
//!
//! Each synthesis request runs to completion through
//! validate → resolve → synthesize → persist → report, and always ends in a
//! [`SynthesisResult`]; no failure escapes as an error or a panic. Panics
//! from engine construction surface as `EngineLoad`, panics from inference
//! as `Inference`.
//!
//! When the inference integration is unavailable for the whole process, the
//! processor writes a fixed empty WAV to the output path and reports
//! `success: false` with that file. Per-request engine failures (missing
//! model, load failure) do not get a placeholder.

pub mod diagnostics;
pub mod types;

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::audio::{ensure_parent_dir, AudioOutput};
use crate::config::BridgeConfig;
use crate::core::error::{panic_message, ErrorKind, Result, TtsError};
use crate::engine::{Backend, EngineCache, InferenceOptions};
use crate::registry::VoiceRegistry;
use diagnostics::{render_trace, truncate_trace, write_error_log};

pub use types::{
    FailureResponse, ListVoicesResult, SynthesisRequest, SynthesisResult, VoiceDescriptor,
    DEFAULT_OUTPUT_PATH,
};

/// Settings the processor needs beyond the engine cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSettings {
    pub error_log_path: PathBuf,
    pub sample_rate: u32,
    pub trace_limit: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self::from(&BridgeConfig::default())
    }
}

impl From<&BridgeConfig> for ProcessorSettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            error_log_path: config.error_log_path.clone(),
            sample_rate: config.sample_rate,
            trace_limit: config.trace_limit,
        }
    }
}

/// Turns synthesis requests into structured results
pub struct RequestProcessor {
    engines: EngineCache,
    settings: ProcessorSettings,
}

impl RequestProcessor {
    pub fn new(engines: EngineCache, settings: ProcessorSettings) -> Self {
        Self { engines, settings }
    }

    /// Open the registry and resolve the integration described by `config`
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let registry = VoiceRegistry::open(&config.registry_path)?;
        let backend = Backend::from_settings(&config.engine);
        let engines = EngineCache::from_config(config, registry, backend);
        Ok(Self::new(engines, ProcessorSettings::from(config)))
    }

    pub fn engines(&self) -> &EngineCache {
        &self.engines
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    /// Run one synthesis request
    pub fn process(&self, request: &SynthesisRequest) -> SynthesisResult {
        info!(
            "TTS request: {} chars, voice={:?}, custom_voice={:?}, output={:?}",
            request.text.chars().count(),
            request.voice_id,
            request.custom_voice_path,
            request.output_path
        );

        if let Err(e) = Self::validate(request) {
            return self.fail(request, e);
        }

        if let Backend::Unavailable { reason } = self.engines.backend() {
            return self.degrade(request, reason);
        }

        match self.synthesize(request) {
            Ok(()) => self.succeed(request),
            Err(e) => self.fail(request, e),
        }
    }

    /// Describe every voice and its cache state
    pub fn list_voices(&self) -> ListVoicesResult {
        match self.engines.describe_all() {
            Ok(voices) => ListVoicesResult {
                success: true,
                voices: Some(voices),
                message: None,
                trace: None,
            },
            Err(e) => {
                error!("Listing voices failed: {}", e);
                ListVoicesResult {
                    success: false,
                    voices: None,
                    message: Some(format!("Error listing voices: {}", e)),
                    trace: Some(truncate_trace(&render_trace(&e), self.settings.trace_limit)),
                }
            }
        }
    }

    fn validate(request: &SynthesisRequest) -> Result<()> {
        if request.text.trim().is_empty() {
            return Err(TtsError::InvalidRequest {
                message: "text is required for TTS".to_string(),
                field: Some("text".to_string()),
            });
        }
        Ok(())
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<()> {
        let engine = self.engines.resolve(request.voice_id.as_deref())?;

        let options = match &request.custom_voice_path {
            Some(sample) => {
                if !sample.exists() {
                    return Err(TtsError::FileNotFound { path: sample.clone() });
                }
                InferenceOptions::from_sample(sample)
            }
            None => InferenceOptions::default(),
        };

        let samples = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.inference(&request.text, &options)
        }))
        .map_err(|payload| TtsError::Inference {
            message: format!("engine panicked: {}", panic_message(payload.as_ref())),
        })??;

        let output = &request.output_path;
        ensure_parent_dir(output)?;
        AudioOutput::save(&samples, self.settings.sample_rate, output)?;

        if !output.exists() {
            return Err(TtsError::OutputWrite {
                message: "file missing after write".to_string(),
                path: output.clone(),
            });
        }
        Ok(())
    }

    fn succeed(&self, request: &SynthesisRequest) -> SynthesisResult {
        let voice = request
            .voice_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| {
                self.engines.registry().get(id).map(|v| VoiceDescriptor {
                    voice_id: id.to_string(),
                    display_name: v.display_name.clone(),
                })
            });

        info!("Audio written to {:?}", request.output_path);
        SynthesisResult {
            success: true,
            file: Some(request.output_path.clone()),
            message: format!(
                "Audio generated successfully using {}",
                self.engines.device().describe()
            ),
            voice,
            error_kind: None,
            trace: None,
            log_file: None,
        }
    }

    fn degrade(&self, request: &SynthesisRequest, reason: &str) -> SynthesisResult {
        warn!("Speech engine unavailable ({}), writing placeholder audio", reason);
        if let Err(e) = AudioOutput::write_placeholder(&request.output_path) {
            return self.fail(request, e);
        }

        SynthesisResult {
            success: false,
            file: Some(request.output_path.clone()),
            message: format!(
                "Speech engine is not available: {}. Created an empty audio file as fallback.",
                reason
            ),
            voice: None,
            error_kind: Some(ErrorKind::IntegrationUnavailable),
            trace: None,
            log_file: None,
        }
    }

    fn fail(&self, request: &SynthesisRequest, err: TtsError) -> SynthesisResult {
        error!("TTS request failed: {}", err);

        let kind = err.kind();
        let trace = render_trace(&err);
        let log_file = match write_error_log(&self.settings.error_log_path, request, &err, &trace) {
            Ok(()) => Some(self.settings.error_log_path.clone()),
            Err(log_err) => {
                warn!("Could not write error log: {}", log_err);
                None
            }
        };

        let message = match kind {
            ErrorKind::InvalidRequest => err.to_string(),
            kind if kind.is_file_not_found() => format!("File not found: {}", err),
            _ => format!("Error generating audio: {}", err),
        };

        SynthesisResult {
            success: false,
            file: None,
            message,
            voice: None,
            error_kind: Some(kind),
            trace: Some(truncate_trace(&trace, self.settings.trace_limit)),
            log_file,
        }
    }
}
