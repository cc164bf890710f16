use std::sync::Arc;

use elevenlabs_core::{ApiRequest, AudioStream, CancellationToken, HttpTransport, Result};

use super::require_id;
use crate::types::{DEFAULT_OUTPUT_FORMAT, TextToSpeechRequest};

/// Speech synthesis
#[derive(Debug, Clone)]
pub struct TextToSpeechService {
    transport: Arc<HttpTransport>,
}

impl TextToSpeechService {
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Synthesize `request` with `voice_id`
    ///
    /// `output_format` defaults to `mp3_44100_128`. The audio is returned as
    /// a stream; collect it with [`AudioStream::into_bytes`] if the whole
    /// clip is wanted in memory.
    pub async fn convert(
        &self,
        voice_id: &str,
        request: &TextToSpeechRequest,
        output_format: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AudioStream> {
        self.synthesize("", voice_id, request, output_format, cancel).await
    }

    /// Like [`convert`](Self::convert), but on the low-latency streaming endpoint
    pub async fn stream(
        &self,
        voice_id: &str,
        request: &TextToSpeechRequest,
        output_format: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AudioStream> {
        self.synthesize("/stream", voice_id, request, output_format, cancel).await
    }

    async fn synthesize(
        &self,
        suffix: &str,
        voice_id: &str,
        request: &TextToSpeechRequest,
        output_format: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AudioStream> {
        let voice_id = require_id("voice_id", voice_id)?;
        request.validate()?;

        tracing::debug!(
            voice_id,
            model_id = %request.model_id,
            text_len = request.text.len(),
            streaming = !suffix.is_empty(),
            "text-to-speech request"
        );

        let api_request = ApiRequest::post(format!("text-to-speech/{voice_id}{suffix}"))
            .query("output_format", output_format.unwrap_or(DEFAULT_OUTPUT_FORMAT))
            .accept("audio/mpeg")
            .json(request)?;

        let response = self.transport.send(api_request, cancel).await?;

        Ok(response.into_stream())
    }
}
