use std::sync::Arc;

use elevenlabs_core::{ApiRequest, AudioStream, AudioUpload, CancellationToken, HttpTransport, Result};

use super::{require_id, require_non_blank};

/// Speech-to-speech conversion into another voice
#[derive(Debug, Clone)]
pub struct VoiceChangerService {
    transport: Arc<HttpTransport>,
}

impl VoiceChangerService {
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Re-voice `audio` as `voice_id`
    pub async fn convert(
        &self,
        audio: AudioUpload,
        voice_id: &str,
        model_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AudioStream> {
        self.change("voice-changer/convert", audio, voice_id, model_id, cancel)
            .await
    }

    /// Like [`convert`](Self::convert), but on the streaming endpoint
    pub async fn stream(
        &self,
        audio: AudioUpload,
        voice_id: &str,
        model_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AudioStream> {
        self.change("voice-changer/convert/stream", audio, voice_id, model_id, cancel)
            .await
    }

    async fn change(
        &self,
        path: &str,
        audio: AudioUpload,
        voice_id: &str,
        model_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AudioStream> {
        let voice_id = require_id("voice_id", voice_id)?;
        let model_id = model_id.map(|id| require_non_blank("model_id", id)).transpose()?;

        tracing::debug!(path, voice_id, model_id, "voice changer request");

        let request = ApiRequest::post(path)
            .query("voice_id", voice_id)
            .query_opt("model_id", model_id)
            .accept("audio/mpeg")
            .multipart(audio);

        Ok(self.transport.send(request, cancel).await?.into_stream())
    }
}
