use std::collections::BTreeMap;

use elevenlabs_core::{ElevenLabsError, Result};
use serde::{Deserialize, Serialize};

/// Model used for synthesis when the caller does not pick one
pub const DEFAULT_TTS_MODEL: &str = "eleven_monolingual_v1";

/// Text normalization mode used when the caller does not pick one
pub const DEFAULT_TEXT_NORMALIZATION: &str = "auto";

/// Output format requested when the caller does not pick one
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

// -- Voices --

/// A voice available to the account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// e.g. `premade`, `cloned`, `professional`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free-form labels such as accent or age
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    /// Subscription tiers the voice can be used on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for_tiers: Option<Vec<String>>,
    /// Model ids the voice works with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<VoiceSettings>,
}

/// Tuning applied when a voice is synthesized
///
/// `stability`, `similarity_boost` and `style` each lie in `0.0..=1.0`.
/// Values outside that range are rejected by [`VoiceSettings::validate`]
/// before they are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceSettings {
    /// Higher is more consistent, lower is more varied
    pub stability: f64,
    /// How closely output should match the reference audio
    pub similarity_boost: f64,
    /// Style exaggeration
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl VoiceSettings {
    pub const fn new(stability: f64, similarity_boost: f64) -> Self {
        Self {
            stability,
            similarity_boost,
            style: 0.0,
            use_speaker_boost: false,
        }
    }

    #[must_use]
    pub const fn with_style(mut self, style: f64) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn with_speaker_boost(mut self, enabled: bool) -> Self {
        self.use_speaker_boost = enabled;
        self
    }

    /// Check every ranged setting
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::InvalidArgument`] naming the first setting
    /// outside `0.0..=1.0` (NaN included)
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
            ("style", self.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ElevenLabsError::InvalidArgument(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }

        Ok(())
    }
}

/// `GET voices` envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoicesResponse {
    #[serde(default)]
    pub voices: Vec<Voice>,
}

// -- Models --

/// A synthesis or conversion model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Language codes the model accepts
    pub supported_languages: Vec<String>,
    pub can_do_text_to_speech: bool,
    pub can_do_voice_conversion: bool,
    /// Relative character cost, as reported by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_cost_factor: Option<String>,
}

/// `GET models` envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<Model>,
}

// -- Text to speech --

/// Reference to a pronunciation dictionary version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationDictionaryLocator {
    pub id: String,
    pub version_id: String,
}

/// Body of a text-to-speech call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechRequest {
    /// Text to speak
    pub text: String,
    pub model_id: String,
    /// ISO 639-1 language code, for models that support it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    /// Overrides the voice's stored settings for this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_dictionary_locators: Option<Vec<PronunciationDictionaryLocator>>,
    /// Best-effort determinism; the API accepts `0..=4_294_967_295`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Text spoken before this request, for continuity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_text: Option<String>,
    /// Text spoken after this request, for continuity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_request_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_request_ids: Option<Vec<String>>,
    /// `auto`, `on` or `off`
    #[serde(default = "default_text_normalization")]
    pub apply_text_normalization: String,
}

impl TextToSpeechRequest {
    /// Request `text` with the default model and normalization
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_id: DEFAULT_TTS_MODEL.to_owned(),
            language_code: None,
            voice_settings: None,
            pronunciation_dictionary_locators: None,
            seed: None,
            previous_text: None,
            next_text: None,
            previous_request_ids: None,
            next_request_ids: None,
            apply_text_normalization: default_text_normalization(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    #[must_use]
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    #[must_use]
    pub const fn with_voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = Some(settings);
        self
    }

    #[must_use]
    pub fn with_pronunciation_dictionary(mut self, locator: PronunciationDictionaryLocator) -> Self {
        self.pronunciation_dictionary_locators
            .get_or_insert_with(Vec::new)
            .push(locator);
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_context(mut self, previous_text: Option<String>, next_text: Option<String>) -> Self {
        self.previous_text = previous_text;
        self.next_text = next_text;
        self
    }

    #[must_use]
    pub fn with_text_normalization(mut self, mode: impl Into<String>) -> Self {
        self.apply_text_normalization = mode.into();
        self
    }

    /// Reject requests the API would refuse
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::InvalidArgument`] if the text or model id
    /// is blank, or the voice settings are out of range
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(ElevenLabsError::InvalidArgument("text must not be blank".to_owned()));
        }

        if self.model_id.trim().is_empty() {
            return Err(ElevenLabsError::InvalidArgument("model_id must not be blank".to_owned()));
        }

        if let Some(settings) = &self.voice_settings {
            settings.validate()?;
        }

        Ok(())
    }
}

fn default_text_normalization() -> String {
    DEFAULT_TEXT_NORMALIZATION.to_owned()
}

// -- Speech to text --

/// Transcription result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechToTextResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}
