//! Core framework-level components
//!
//! - `error`: Structured error handling with a tagged error kind

pub mod error;

pub use error::{panic_message, ErrorKind, Result, ResultExt, TtsError};
