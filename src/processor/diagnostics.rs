//! Failure diagnostics: the error log record and truncated traces

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::path::Path;

use crate::core::error::{Result, TtsError};
use super::types::SynthesisRequest;

/// Full diagnostic trace for `err`: kind, message, debug form and a stack
/// backtrace of the reporting site, captured regardless of `RUST_BACKTRACE`.
pub fn render_trace(err: &TtsError) -> String {
    let mut trace = format!("{}: {}\n{:?}\n", err.kind(), err, err);
    let _ = write!(trace, "{}", Backtrace::force_capture());
    trace
}

/// Keep the first `limit` characters, marking the cut with `...`
pub fn truncate_trace(trace: &str, limit: usize) -> String {
    match trace.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &trace[..cut]),
        None => trace.to_string(),
    }
}

/// Overwrite the error log at `path` with one failure record
pub fn write_error_log(path: &Path, request: &SynthesisRequest, err: &TtsError, trace: &str) -> Result<()> {
    let mut record = String::new();
    let _ = writeln!(record, "Timestamp: {}", chrono::Utc::now().to_rfc3339());
    let _ = writeln!(record, "Error processing text: {}", request.text);
    let _ = writeln!(record, "Voice ID: {}", display_opt(request.voice_id.as_deref()));
    let _ = writeln!(
        record,
        "Custom voice path: {}",
        display_opt(request.custom_voice_path.as_deref().map(|p| p.to_string_lossy()).as_deref())
    );
    let _ = writeln!(record, "Output path: {}", request.output_path.display());
    let _ = writeln!(record, "Exception: {}", err);
    let _ = write!(record, "Traceback:\n{}", trace);

    crate::audio::ensure_parent_dir(path)?;
    std::fs::write(path, record).map_err(|e| TtsError::Io {
        message: format!("Failed to write error log: {}", e),
        path: Some(path.to_path_buf()),
    })
}

fn display_opt(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_truncate_trace() {
        assert_eq!(truncate_trace("short", 200), "short");
        let long = "x".repeat(250);
        let cut = truncate_trace(&long, 200);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_trace(&"é".repeat(5), 3), "ééé...");
    }

    #[test]
    fn test_error_log_record() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs").join("tts_error.log");
        let request = SynthesisRequest::new("hello")
            .with_voice("narrator")
            .with_output("out/a.wav");
        let err = TtsError::FileNotFound {
            path: PathBuf::from("sample.wav"),
        };

        write_error_log(&log, &request, &err, &render_trace(&err)).unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.contains("Error processing text: hello"));
        assert!(content.contains("Voice ID: narrator"));
        assert!(content.contains("Custom voice path: None"));
        assert!(content.contains("Output path: out/a.wav"));
        assert!(content.contains("Exception: Voice file not found: sample.wav"));
        assert!(content.contains("Traceback:\nFileNotFoundError"));
    }

    #[test]
    fn test_trace_includes_backtrace() {
        let err = TtsError::Inference {
            message: "boom".to_string(),
        };
        let trace = render_trace(&err);
        let header = format!("{}: {}\n{:?}\n", err.kind(), err, err);
        assert!(trace.starts_with(&header));
        assert!(trace.len() > header.len());
        assert!(trace.contains("render_trace"));
    }
}
