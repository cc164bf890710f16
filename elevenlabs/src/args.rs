use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// `ElevenLabs` voice API client
#[derive(Debug, Parser)]
#[command(name = "elevenlabs", about = "Command-line client for the ElevenLabs voice API")]
pub struct Args {
    /// Path to a TOML configuration file; the environment is used when omitted
    #[arg(short, long, env = "ELEVENLABS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter directive (e.g. `debug`, `elevenlabs_core=trace`)
    #[arg(long, default_value = "warn", env = "ELEVENLABS_LOG")]
    pub log_filter: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available voices
    Voices {
        /// Include legacy voices
        #[arg(long)]
        legacy: bool,
    },
    /// Show a single voice and its settings
    Voice {
        /// Voice id
        id: String,
    },
    /// List available models
    Models,
    /// Synthesize speech from text
    Speak {
        /// Voice id to speak with
        #[arg(long)]
        voice: String,
        /// Text to speak
        #[arg(long)]
        text: String,
        /// File the audio is written to
        #[arg(long)]
        out: PathBuf,
        /// Model id
        #[arg(long)]
        model: Option<String>,
        /// Output format (e.g. `mp3_44100_128`, `pcm_16000`)
        #[arg(long)]
        format: Option<String>,
        /// Use the low-latency streaming endpoint
        #[arg(long)]
        stream: bool,
    },
    /// Transcribe an audio file
    Transcribe {
        /// Audio file to upload
        file: PathBuf,
        /// Model id
        #[arg(long)]
        model: Option<String>,
    },
    /// Re-voice an audio file
    ChangeVoice {
        /// Audio file to upload
        file: PathBuf,
        /// Target voice id
        #[arg(long)]
        voice: String,
        /// File the audio is written to
        #[arg(long)]
        out: PathBuf,
        /// Model id
        #[arg(long)]
        model: Option<String>,
        /// Use the streaming endpoint
        #[arg(long)]
        stream: bool,
    },
    /// Remove background noise from an audio file
    Isolate {
        /// Audio file to upload
        file: PathBuf,
        /// File the audio is written to
        #[arg(long)]
        out: PathBuf,
        /// Use the streaming endpoint
        #[arg(long)]
        stream: bool,
    },
}
