//! External-process inference integration
//!
//! Runs an inference program once per request. The program receives the
//! model directory, device, text and generation controls as flags, writes a
//! WAV file to the path given by `--output`, and exits zero on success.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::audio::AudioOutput;
use crate::config::Device;
use crate::core::error::{Result, ResultExt, TtsError};
use super::traits::{EngineLoader, InferenceOptions, SpeechEngine};

/// Loader for [`CommandEngine`]s
#[derive(Debug, Clone)]
pub struct CommandEngineLoader {
    program: PathBuf,
    args: Vec<String>,
    required_files: Vec<String>,
}

impl CommandEngineLoader {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, required_files: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            required_files,
        }
    }
}

impl EngineLoader for CommandEngineLoader {
    fn name(&self) -> &str {
        "command"
    }

    fn load(&self, model_dir: &Path, device: Device) -> Result<Box<dyn SpeechEngine>> {
        let load_err = |message: String| TtsError::EngineLoad {
            voice_id: String::new(),
            message,
            path: model_dir.to_path_buf(),
        };

        if !model_dir.is_dir() {
            return Err(load_err(format!("{} is not a directory", model_dir.display())));
        }

        let missing: Vec<&str> = self
            .required_files
            .iter()
            .filter(|f| !model_dir.join(f).exists())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(load_err(format!("missing model assets: {}", missing.join(", "))));
        }

        debug!("Command engine bound to {:?} on {}", model_dir, device);
        Ok(Box::new(CommandEngine {
            program: self.program.clone(),
            args: self.args.clone(),
            model_dir: model_dir.to_path_buf(),
            device,
        }))
    }
}

/// Engine that shells out to the inference program
#[derive(Debug)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    model_dir: PathBuf,
    device: Device,
}

impl CommandEngine {
    fn command(&self, text: &str, options: &InferenceOptions, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--model-dir")
            .arg(&self.model_dir)
            .arg("--device")
            .arg(self.device.to_string())
            .arg("--text")
            .arg(text)
            .arg("--output")
            .arg(output);

        match options {
            InferenceOptions::Clone {
                prompt_speech_path,
                prompt_text,
            } => {
                cmd.arg("--prompt-speech-path")
                    .arg(prompt_speech_path)
                    .arg("--prompt-text")
                    .arg(prompt_text);
            }
            InferenceOptions::Control { gender, pitch, speed } => {
                cmd.arg("--gender")
                    .arg(gender.to_string())
                    .arg("--pitch")
                    .arg(pitch.to_string())
                    .arg("--speed")
                    .arg(speed.to_string());
            }
        }
        cmd
    }
}

impl SpeechEngine for CommandEngine {
    fn inference(&self, text: &str, options: &InferenceOptions) -> Result<Vec<f32>> {
        let scratch = tempfile::Builder::new()
            .prefix("voice-bridge-")
            .suffix(".wav")
            .tempfile()
            .context("Failed to create engine output file")?;
        let output = scratch.path().to_path_buf();

        let result = self
            .command(text, options, &output)
            .output()
            .map_err(|e| TtsError::Inference {
                message: format!("failed to spawn {}: {}", self.program.display(), e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TtsError::Inference {
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    result.status,
                    stderr.trim()
                ),
            });
        }

        AudioOutput::read_samples(&output).map_err(|e| TtsError::Inference {
            message: format!("unreadable engine output: {}", e),
        })
    }

    fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}
