//! Audio file output
//!
//! Provides:
//! - WAV file saving (16-bit PCM)
//! - The empty placeholder written when no engine is available
//! - WAV reading back to normalized samples

use std::path::Path;

use crate::core::error::{Result, TtsError};

/// Minimal valid WAV: mono, 8-bit PCM, 1024 Hz, no samples
pub const PLACEHOLDER_WAV: [u8; 44] = *b"RIFF$\x00\x00\x00WAVEfmt \x10\x00\x00\x00\x01\x00\x01\x00\x00\x04\x00\x00\x00\x04\x00\x00\x01\x00\x08\x00data\x00\x00\x00\x00";

/// Audio file handler
pub struct AudioOutput;

impl AudioOutput {
    /// Save audio samples to a WAV file (16-bit PCM)
    ///
    /// # Arguments
    /// * `samples` - Audio samples (f32, normalized to [-1, 1])
    /// * `sample_rate` - Sample rate in Hz
    /// * `path` - Output file path
    pub fn save<P: AsRef<Path>>(samples: &[f32], sample_rate: u32, path: P) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path.as_ref(), spec).map_err(|e| TtsError::Io {
            message: format!("Failed to create WAV file: {}", e),
            path: Some(path.as_ref().to_path_buf()),
        })?;

        for &sample in samples {
            let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(scaled)?;
        }

        writer.finalize()?;
        Ok(())
    }

    /// Write the fixed empty placeholder, creating parent directories
    pub fn write_placeholder<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        std::fs::write(path, PLACEHOLDER_WAV).map_err(|e| TtsError::Io {
            message: format!("Failed to write placeholder audio: {}", e),
            path: Some(path.to_path_buf()),
        })
    }

    /// Read a WAV file as mono samples normalized to [-1, 1].
    ///
    /// Multi-channel input is downmixed by averaging.
    pub fn read_samples<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
        let reader = hound::WavReader::open(path.as_ref()).map_err(|e| TtsError::Io {
            message: format!("Failed to open WAV file: {}", e),
            path: Some(path.as_ref().to_path_buf()),
        })?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        if channels == 1 {
            return Ok(interleaved);
        }
        Ok(interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect())
    }
}

/// Create the parent directory of `path` if it has one
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| TtsError::Io {
                message: format!("Failed to create output directory: {}", e),
                path: Some(parent.to_path_buf()),
            })
        }
        _ => Ok(()),
    }
}
