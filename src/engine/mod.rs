//! Engine layer
//!
//! ```text
//! RequestProcessor
//!       │ resolve(voice_id)
//!       ▼
//! EngineCache ── VoiceRegistry (voice id → model dir)
//!       │ load(model_dir, device), first use only
//!       ▼
//! Backend ── EngineLoader ── SpeechEngine::inference
//! ```

pub mod backend;
pub mod cache;
pub mod command;
pub mod traits;

pub use backend::Backend;
pub use cache::{EngineCache, VoiceStatus, DEFAULT_VOICE_ID, DEFAULT_VOICE_NAME};
pub use command::{CommandEngine, CommandEngineLoader};
pub use traits::{EngineLoader, Gender, InferenceOptions, Level, SpeechEngine, CLONE_PROMPT_TEXT};
