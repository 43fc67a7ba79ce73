//! manage-voices CLI - edit the voice registry

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use voice_bridge::config::DEFAULT_CONFIG_FILE;
use voice_bridge::{BridgeConfig, VoiceRegistry};

/// Manage TTS voices
#[derive(Parser, Debug)]
#[command(name = "manage-voices")]
#[command(author, version, about = "Manage TTS voices", long_about = None)]
struct Cli {
    /// Bridge configuration file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the voice registry document
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add or update a voice
    Add {
        /// Unique identifier for the voice
        voice_id: String,
        /// Path to model directory
        model_dir: PathBuf,
        /// Display name for the voice
        display_name: String,
    },

    /// Remove a voice
    Remove {
        /// Voice ID to remove
        voice_id: String,
    },

    /// List all voices
    List,

    /// Check that a voice exists and its model directory is present
    Validate {
        /// Voice ID to check
        voice_id: String,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let registry_path = match &cli.registry {
        Some(path) => path.clone(),
        None => {
            BridgeConfig::load_or_default(&cli.config)
                .with_context(|| format!("Failed to load config {:?}", cli.config))?
                .registry_path
        }
    };
    let mut registry = VoiceRegistry::open(&registry_path)
        .with_context(|| format!("Failed to open voice registry {:?}", registry_path))?;

    match cli.command {
        Commands::Add {
            voice_id,
            model_dir,
            display_name,
        } => {
            registry.add_or_update(&voice_id, model_dir, display_name)?;
            println!("Voice '{}' added/updated successfully", voice_id);
        }

        Commands::Remove { voice_id } => {
            if registry.remove(&voice_id)? {
                println!("Voice '{}' removed successfully", voice_id);
            } else {
                println!("Voice '{}' not found", voice_id);
            }
        }

        Commands::List => {
            println!("\nRegistered Voices:");
            println!("================");
            for (voice_id, voice) in registry.list() {
                println!("\nID: {}", voice_id);
                println!("Name: {}", voice.display_name);
                println!("Model Directory: {}", voice.model_dir.display());
                println!("Valid: {}", registry.validate(voice_id));
            }
        }

        Commands::Validate { voice_id } => {
            let valid = registry.validate(&voice_id);
            println!("Voice '{}' valid: {}", voice_id, valid);
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
