#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::{path::Path, process::ExitCode};

use anyhow::Context;
use args::{Args, Command};
use clap::Parser;
use elevenlabs_client::{
    AudioStream, AudioUpload, CancellationToken, ClientConfig, ElevenLabsClient, TextToSpeechRequest,
};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

/// Conventional exit status for a run interrupted by the user
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    init_logging(&args.log_filter, args.json_logs);

    let config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::from_env()?,
    };

    let client = ElevenLabsClient::new(&config)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    match run(&client, args.command, &cancel).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if is_cancelled(&e) => {
            eprintln!("cancelled");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        Err(e) => Err(e),
    }
}

async fn run(client: &ElevenLabsClient, command: Command, cancel: &CancellationToken) -> anyhow::Result<()> {
    match command {
        Command::Voices { legacy } => {
            for voice in client.voices().list(legacy, cancel).await? {
                println!(
                    "{}\t{}\t{}",
                    voice.voice_id.as_deref().unwrap_or("-"),
                    voice.name.as_deref().unwrap_or("-"),
                    voice.category.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Voice { id } => {
            let voice = client.voices().get(&id, cancel).await?;
            let settings = client.voices().settings(&id, cancel).await?;

            println!("id:          {}", voice.voice_id.as_deref().unwrap_or(&id));
            println!("name:        {}", voice.name.as_deref().unwrap_or("-"));
            println!("category:    {}", voice.category.as_deref().unwrap_or("-"));
            println!("description: {}", voice.description.as_deref().unwrap_or("-"));
            println!(
                "settings:    stability={} similarity_boost={} style={} speaker_boost={}",
                settings.stability, settings.similarity_boost, settings.style, settings.use_speaker_boost
            );
        }
        Command::Models => {
            for model in client.models().list(cancel).await? {
                println!(
                    "{}\t{}\ttts={}\tsts={}",
                    model.id, model.name, model.can_do_text_to_speech, model.can_do_voice_conversion
                );
            }
        }
        Command::Speak {
            voice,
            text,
            out,
            model,
            format,
            stream,
        } => {
            let mut request = TextToSpeechRequest::new(text);
            if let Some(model) = model {
                request = request.with_model(model);
            }

            let tts = client.text_to_speech();
            let audio = if stream {
                tts.stream(&voice, &request, format.as_deref(), cancel).await?
            } else {
                tts.convert(&voice, &request, format.as_deref(), cancel).await?
            };

            save_audio(audio, &out).await?;
        }
        Command::Transcribe { file, model } => {
            let upload = AudioUpload::open(&file).await?;
            let transcript = client
                .speech_to_text()
                .transcribe(upload, model.as_deref(), cancel)
                .await?;

            println!("{}", transcript.text);
        }
        Command::ChangeVoice {
            file,
            voice,
            out,
            model,
            stream,
        } => {
            let upload = AudioUpload::open(&file).await?;
            let changer = client.voice_changer();
            let audio = if stream {
                changer.stream(upload, &voice, model.as_deref(), cancel).await?
            } else {
                changer.convert(upload, &voice, model.as_deref(), cancel).await?
            };

            save_audio(audio, &out).await?;
        }
        Command::Isolate { file, out, stream } => {
            let upload = AudioUpload::open(&file).await?;
            let isolation = client.audio_isolation();
            let audio = if stream {
                isolation.stream(upload, cancel).await?
            } else {
                isolation.isolate(upload, cancel).await?
            };

            save_audio(audio, &out).await?;
        }
    }

    Ok(())
}

/// Copy audio to `path` chunk by chunk as it arrives
async fn save_audio(mut audio: AudioStream, path: &Path) -> anyhow::Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut written: u64 = 0;

    while let Some(chunk) = audio.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written += chunk.len() as u64;
    }

    file.flush().await?;

    tracing::info!(path = %path.display(), bytes = written, "audio saved");

    Ok(())
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<elevenlabs_client::ElevenLabsError>()
        .is_some_and(elevenlabs_client::ElevenLabsError::is_cancelled)
}

fn init_logging(log_filter: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received, cancelling");
}
