use std::sync::Arc;

use elevenlabs_core::{ApiRequest, AudioUpload, CancellationToken, HttpTransport, Result};

use super::require_non_blank;
use crate::types::SpeechToTextResponse;

/// Transcription
#[derive(Debug, Clone)]
pub struct SpeechToTextService {
    transport: Arc<HttpTransport>,
}

impl SpeechToTextService {
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Transcribe `audio`, optionally with a specific model
    pub async fn transcribe(
        &self,
        audio: AudioUpload,
        model_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<SpeechToTextResponse> {
        let model_id = model_id.map(|id| require_non_blank("model_id", id)).transpose()?;

        tracing::debug!(file_name = audio.file_name(), model_id, "speech-to-text request");

        let request = ApiRequest::post("speech-to-text")
            .query_opt("model_id", model_id)
            .multipart(audio);

        self.transport.send(request, cancel).await?.json().await
    }
}
