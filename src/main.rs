//! voice-bridge CLI - structured synthesis bridge
//!
//! Prints exactly one JSON line on standard output: the synthesis result,
//! the voice listing, or an `Unexpected error` failure. Logs go to standard
//! error so the result line can be parsed by a calling process.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use voice_bridge::config::DEFAULT_CONFIG_FILE;
use voice_bridge::core::panic_message;
use voice_bridge::processor::DEFAULT_OUTPUT_PATH;
use voice_bridge::{BridgeConfig, FailureResponse, RequestProcessor, SynthesisRequest, VERSION};

/// Bridge actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum Action {
    /// Synthesize `--text` to `--output`
    #[default]
    Tts,
    /// Describe registered voices and their load state
    #[value(name = "list_voices")]
    ListVoices,
}

/// voice-bridge - text-to-speech bridge with a voice registry
#[derive(Parser, Debug)]
#[command(name = "voice-bridge")]
#[command(author, version, about = "Text-to-speech bridge emitting one JSON result line")]
struct Cli {
    /// Action to perform
    #[arg(long, value_enum, default_value = "tts")]
    action: Action,

    /// Text to convert to speech
    #[arg(long)]
    text: Option<String>,

    /// Voice ID from the voice registry
    #[arg(long)]
    voice_id: Option<String>,

    /// Path to a voice sample for cloning
    #[arg(long)]
    custom_voice: Option<PathBuf>,

    /// Output audio file path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Bridge configuration file (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the voice registry document
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn run(cli: &Cli) -> Result<String> {
    let mut config = BridgeConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;
    if let Some(registry) = &cli.registry {
        config.registry_path = registry.clone();
    }

    let processor =
        RequestProcessor::from_config(&config).context("Failed to initialize voice bridge")?;

    let line = match cli.action {
        Action::ListVoices => serde_json::to_string(&processor.list_voices())?,
        Action::Tts => {
            let request = SynthesisRequest {
                text: cli.text.clone().unwrap_or_default(),
                voice_id: cli.voice_id.clone(),
                custom_voice_path: cli.custom_voice.clone(),
                output_path: cli.output.clone(),
            };
            serde_json::to_string(&processor.process(&request))?
        }
    };
    Ok(line)
}

fn to_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| r#"{"success":false,"message":"Unexpected error: unserializable result"}"#.to_string())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let message = e.render().to_string();
            let failure = FailureResponse::unexpected(message.trim(), None);
            println!("{}", to_line(&failure));
            return ExitCode::SUCCESS;
        }
    };
    setup_logging(cli.verbose);

    info!("voice-bridge v{}", VERSION);

    let line = match panic::catch_unwind(AssertUnwindSafe(|| run(&cli))) {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => to_line(&FailureResponse::unexpected(format!("{:#}", e), Some(format!("{:?}", e)))),
        Err(payload) => to_line(&FailureResponse::unexpected(panic_message(payload.as_ref()), None)),
    };

    // The outcome is carried by the JSON line, not the exit status.
    println!("{}", line);
    ExitCode::SUCCESS
}
