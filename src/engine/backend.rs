//! Process-scope availability of the inference integration

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::EngineSettings;
use super::command::CommandEngineLoader;
use super::traits::EngineLoader;

/// The inference integration as it stands for this process.
///
/// Decided once at startup. When unavailable, synthesis requests degrade to a
/// placeholder artifact instead of failing outright.
#[derive(Clone)]
pub enum Backend {
    Available(Arc<dyn EngineLoader>),
    Unavailable { reason: String },
}

impl Backend {
    pub fn available(loader: impl EngineLoader + 'static) -> Self {
        Backend::Available(Arc::new(loader))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Backend::Unavailable {
            reason: reason.into(),
        }
    }

    /// Resolve the integration described by `settings`
    pub fn from_settings(settings: &EngineSettings) -> Self {
        let Some(command) = settings.command.as_ref() else {
            warn!("No inference command configured; synthesis will produce placeholders");
            return Backend::unavailable("no inference command configured");
        };

        match which::which(command) {
            Ok(program) => {
                info!(
                    "Inference integration ready: {:?} on {}",
                    program,
                    settings.device.describe()
                );
                Backend::available(CommandEngineLoader::new(
                    program,
                    settings.args.clone(),
                    settings.required_files.clone(),
                ))
            }
            Err(e) => {
                warn!("Inference command {:?} unavailable: {}", command, e);
                Backend::unavailable(format!(
                    "inference command '{}' not found: {}",
                    command.display(),
                    e
                ))
            }
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Available(loader) => f.debug_tuple("Available").field(&loader.name()).finish(),
            Backend::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}
