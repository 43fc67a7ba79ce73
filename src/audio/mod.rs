//! Audio processing modules
//!
//! - WAV file saving at the bridge sample rate
//! - Placeholder artifact for the degraded path
//! - WAV decoding of engine output

mod output;

pub use output::{ensure_parent_dir, AudioOutput, PLACEHOLDER_WAV};
