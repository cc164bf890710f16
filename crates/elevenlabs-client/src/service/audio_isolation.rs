use std::sync::Arc;

use elevenlabs_core::{ApiRequest, AudioStream, AudioUpload, CancellationToken, HttpTransport, Result};

/// Background noise removal
#[derive(Debug, Clone)]
pub struct AudioIsolationService {
    transport: Arc<HttpTransport>,
}

impl AudioIsolationService {
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Strip everything but the voice from `audio`
    pub async fn isolate(&self, audio: AudioUpload, cancel: &CancellationToken) -> Result<AudioStream> {
        self.run("audio-isolation/isolate-voice", audio, cancel).await
    }

    pub async fn stream(&self, audio: AudioUpload, cancel: &CancellationToken) -> Result<AudioStream> {
        self.run("audio-isolation/isolate-voice/stream", audio, cancel).await
    }

    async fn run(&self, path: &str, audio: AudioUpload, cancel: &CancellationToken) -> Result<AudioStream> {
        tracing::debug!(path, file_name = audio.file_name(), "audio isolation request");

        let request = ApiRequest::post(path).accept("audio/mpeg").multipart(audio);

        Ok(self.transport.send(request, cancel).await?.into_stream())
    }
}
