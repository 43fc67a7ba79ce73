//! Compute device selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::TtsError;

/// Device an engine is bound to when it is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    /// Host CPU
    #[default]
    Cpu,
    /// CUDA GPU by ordinal
    Cuda(u32),
}

impl Device {
    /// Human-readable name used in result messages
    pub fn describe(&self) -> String {
        match self {
            Device::Cpu => "CPU".to_string(),
            Device::Cuda(ordinal) => format!("CUDA device {}", ordinal),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

impl FromStr for Device {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda(0)),
            other => {
                let ordinal = other
                    .strip_prefix("cuda:")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| TtsError::Config {
                        message: format!(
                            "Unknown device '{}' (expected cpu, cuda or cuda:N)",
                            s
                        ),
                        path: None,
                    })?;
                Ok(Device::Cuda(ordinal))
            }
        }
    }
}

impl TryFrom<String> for Device {
    type Error = TtsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}
