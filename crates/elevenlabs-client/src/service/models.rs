use std::sync::Arc;

use elevenlabs_core::{CancellationToken, HttpTransport, Result};

use crate::types::{Model, ModelsResponse};

/// Available models
#[derive(Debug, Clone)]
pub struct ModelService {
    transport: Arc<HttpTransport>,
}

impl ModelService {
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<Model>> {
        let envelope: ModelsResponse = self.transport.get("models", cancel).await?.json().await?;

        tracing::debug!(count = envelope.models.len(), "listed models");

        Ok(envelope.models)
    }
}
