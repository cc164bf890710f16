//! Per-resource services built on [`HttpTransport`](elevenlabs_core::HttpTransport)
//!
//! Each service is a thin mapping from typed arguments to an API call. All
//! of them share one transport and propagate its errors unchanged.

mod audio_isolation;
mod models;
mod speech_to_text;
mod text_to_speech;
mod voice_changer;
mod voices;

pub use audio_isolation::AudioIsolationService;
pub use models::ModelService;
pub use speech_to_text::SpeechToTextService;
pub use text_to_speech::TextToSpeechService;
pub use voice_changer::VoiceChangerService;
pub use voices::VoiceService;

use elevenlabs_core::{ElevenLabsError, Result};

/// Check an identifier that is interpolated into a request path
///
/// The id must stay a single path segment once the URL is resolved, so
/// separators, escapes and dot segments are refused.
fn require_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    let id = require_non_blank(name, id)?;

    if id.contains(['/', '\\', '?', '#', '%']) {
        return Err(ElevenLabsError::InvalidArgument(format!(
            "{name} must not contain '/', '\\', '?', '#' or '%'"
        )));
    }

    if id.chars().all(|c| c == '.') {
        return Err(ElevenLabsError::InvalidArgument(format!("{name} must not be a dot segment")));
    }

    Ok(id)
}

fn require_non_blank<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ElevenLabsError::InvalidArgument(format!("{name} must not be blank")));
    }

    Ok(value)
}
