use std::sync::Arc;

use elevenlabs_core::{ApiRequest, CancellationToken, HttpTransport, RequestBody, Result};

use super::require_id;
use crate::types::{Voice, VoiceSettings, VoicesResponse};

/// Voice library and per-voice settings
#[derive(Debug, Clone)]
pub struct VoiceService {
    transport: Arc<HttpTransport>,
}

impl VoiceService {
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List the voices available to the account
    pub async fn list(&self, show_legacy: bool, cancel: &CancellationToken) -> Result<Vec<Voice>> {
        let request = ApiRequest::get("voices").query("show_legacy", show_legacy);
        let envelope: VoicesResponse = self.transport.send(request, cancel).await?.json().await?;

        tracing::debug!(count = envelope.voices.len(), "listed voices");

        Ok(envelope.voices)
    }

    pub async fn get(&self, voice_id: &str, cancel: &CancellationToken) -> Result<Voice> {
        let voice_id = require_id("voice_id", voice_id)?;

        self.transport
            .get(&format!("voices/{voice_id}"), cancel)
            .await?
            .json()
            .await
    }

    /// Settings new voices start with
    pub async fn default_settings(&self, cancel: &CancellationToken) -> Result<VoiceSettings> {
        self.transport.get("voices/settings/default", cancel).await?.json().await
    }

    pub async fn settings(&self, voice_id: &str, cancel: &CancellationToken) -> Result<VoiceSettings> {
        let voice_id = require_id("voice_id", voice_id)?;

        self.transport
            .get(&format!("voices/{voice_id}/settings"), cancel)
            .await?
            .json()
            .await
    }

    /// Replace the stored settings of a voice
    ///
    /// Out-of-range settings are rejected before anything is sent.
    pub async fn edit_settings(
        &self,
        voice_id: &str,
        settings: &VoiceSettings,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let voice_id = require_id("voice_id", voice_id)?;
        settings.validate()?;

        self.transport
            .post(
                &format!("voices/{voice_id}/settings/edit"),
                RequestBody::json(settings)?,
                cancel,
            )
            .await?;

        tracing::debug!(voice_id, "voice settings updated");

        Ok(())
    }

    pub async fn delete(&self, voice_id: &str, cancel: &CancellationToken) -> Result<()> {
        let voice_id = require_id("voice_id", voice_id)?;

        self.transport.delete(&format!("voices/{voice_id}"), cancel).await?;

        tracing::debug!(voice_id, "voice deleted");

        Ok(())
    }
}
