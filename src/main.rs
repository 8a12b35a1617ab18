use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voxbridge::{Config, SpeechSynthesisClient, TranscriptionClient, audio};

/// voxbridge - audio codec and transport bridge for voice assistants
#[derive(Parser)]
#[command(name = "voxbridge", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "VOXBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a WAV file and print its format
    Probe {
        /// Path to a WAV file
        file: PathBuf,
    },
    /// Send a WAV file to the transcription service and print the result
    Transcribe {
        /// Path to a WAV file
        file: PathBuf,
        /// Service host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Service port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Synthesize speech and write the audio to a WAV file
    Synthesize {
        /// Text to synthesize
        text: String,
        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,
        /// Voice identifier (overrides config)
        #[arg(long)]
        voice: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voxbridge=info",
        1 => "info,voxbridge=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Probe { file } => probe(&file),
        Command::Transcribe { file, host, port } => transcribe(&config, &file, host, port).await,
        Command::Synthesize {
            text,
            output,
            voice,
        } => synthesize(&config, &text, &output, voice).await,
    }
}

/// Decode a WAV file and print its format
fn probe(file: &PathBuf) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;
    let audio = audio::decode(&bytes)?;

    println!("{}", file.display());
    println!("  channels:        {}", audio.format.channels);
    println!("  sample rate:     {} Hz", audio.format.sample_rate);
    println!("  bits per sample: {}", audio.format.bits_per_sample);
    println!("  frames:          {}", audio.frames());
    println!("  duration:        {:.3} s", audio.duration_secs());

    Ok(())
}

/// Send a WAV file to the transcription service
async fn transcribe(
    config: &Config,
    file: &PathBuf,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;

    let host = host.unwrap_or_else(|| config.stt.host.clone());
    let port = port.unwrap_or(config.stt.port);

    let client = TranscriptionClient::new(host, port)
        .with_timeout(Duration::from_secs(config.stt.timeout_secs));

    let transcript = client.transcribe(&bytes).await?;
    println!("{transcript}");

    Ok(())
}

/// Synthesize speech and write it out as 16-bit WAV
async fn synthesize(
    config: &Config,
    text: &str,
    output: &PathBuf,
    voice: Option<String>,
) -> anyhow::Result<()> {
    let voice = voice.unwrap_or_else(|| config.tts.voice.clone());

    let client = SpeechSynthesisClient::new(config.tts.api_key.clone(), voice)?
        .with_base_url(config.tts.base_url.clone())
        .with_language(config.tts.language.clone())
        .with_sample_rate(config.tts.sample_rate)
        .with_speed(config.tts.speed);

    let audio = client.synthesize(text).await?;

    let wav = audio::encode(&audio.samples, audio.format.sample_rate, audio.format.channels)?;
    std::fs::write(output, &wav)?;

    println!(
        "wrote {} ({} frames, {:.3} s)",
        output.display(),
        audio.frames(),
        audio.duration_secs()
    );

    Ok(())
}
