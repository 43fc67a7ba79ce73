//! # voice-bridge
//!
//! Voice registry and engine orchestration for text-to-speech.
//!
//! ## Features
//!
//! - **Voice Registry**: named voices mapped to model directories, persisted
//!   as one JSON document with atomic rewrites
//! - **Engine Cache**: one lazily-built engine per voice, with a `"default"`
//!   fallback voice
//! - **Request Processing**: every request ends in a structured result, with
//!   a diagnostic log on failure and a placeholder WAV when no engine
//!   integration is available
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voice_bridge::{BridgeConfig, RequestProcessor, SynthesisRequest};
//!
//! let config = BridgeConfig::load_or_default("voice-bridge.toml")?;
//! let processor = RequestProcessor::from_config(&config)?;
//!
//! let result = processor.process(
//!     &SynthesisRequest::new("Hello world")
//!         .with_voice("narrator")
//!         .with_output("out/hello.wav"),
//! );
//! println!("{}", serde_json::to_string(&result)?);
//! ```
//!
//! ## Registry
//!
//! ```rust,ignore
//! use voice_bridge::VoiceRegistry;
//!
//! let mut registry = VoiceRegistry::open("config/voice_registry.json")?;
//! registry.add_or_update("narrator", "models/narrator", "Narrator")?;
//! assert!(registry.validate("narrator"));
//! ```

pub mod audio;
pub mod config;
pub mod core;
pub mod engine;
pub mod processor;
pub mod registry;

pub use config::{BridgeConfig, Device, EngineSettings};
pub use crate::core::error::{ErrorKind, Result, ResultExt, TtsError};
pub use engine::{
    Backend, CommandEngineLoader, EngineCache, EngineLoader, InferenceOptions, SpeechEngine,
    VoiceStatus, DEFAULT_VOICE_ID,
};
pub use processor::{
    FailureResponse, ListVoicesResult, ProcessorSettings, RequestProcessor, SynthesisRequest,
    SynthesisResult, VoiceDescriptor,
};
pub use registry::{Voice, VoiceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample rate of synthesized audio (16 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;
