use std::sync::Arc;

use elevenlabs_config::ClientConfig;
use elevenlabs_core::{HttpTransport, Result};

use crate::service::{
    AudioIsolationService, ModelService, SpeechToTextService, TextToSpeechService, VoiceChangerService, VoiceService,
};

/// Entry point to the `ElevenLabs` API
///
/// Holds one service per resource, all sharing a single [`HttpTransport`]
/// and therefore a single connection pool. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    transport: Arc<HttpTransport>,
    text_to_speech: TextToSpeechService,
    speech_to_text: SpeechToTextService,
    voices: VoiceService,
    models: ModelService,
    voice_changer: VoiceChangerService,
    audio_isolation: AudioIsolationService,
}

impl ElevenLabsClient {
    /// Create a client from explicit configuration
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::Config`](elevenlabs_core::ElevenLabsError::Config)
    /// if the configuration is invalid
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::from_transport(Arc::new(HttpTransport::new(config)?)))
    }

    /// Create a client from `ELEVENLABS_API_KEY` and friends
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unset or any variable is invalid
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Build the services on an existing transport
    pub fn from_transport(transport: Arc<HttpTransport>) -> Self {
        Self {
            text_to_speech: TextToSpeechService::new(Arc::clone(&transport)),
            speech_to_text: SpeechToTextService::new(Arc::clone(&transport)),
            voices: VoiceService::new(Arc::clone(&transport)),
            models: ModelService::new(Arc::clone(&transport)),
            voice_changer: VoiceChangerService::new(Arc::clone(&transport)),
            audio_isolation: AudioIsolationService::new(Arc::clone(&transport)),
            transport,
        }
    }

    pub const fn text_to_speech(&self) -> &TextToSpeechService {
        &self.text_to_speech
    }

    pub const fn speech_to_text(&self) -> &SpeechToTextService {
        &self.speech_to_text
    }

    pub const fn voices(&self) -> &VoiceService {
        &self.voices
    }

    pub const fn models(&self) -> &ModelService {
        &self.models
    }

    pub const fn voice_changer(&self) -> &VoiceChangerService {
        &self.voice_changer
    }

    pub const fn audio_isolation(&self) -> &AudioIsolationService {
        &self.audio_isolation
    }

    /// Transport shared by every service
    pub const fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }
}
