#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Typed Rust client for the `ElevenLabs` voice API
//!
//! [`ElevenLabsClient`] exposes text-to-speech, speech-to-text, voices,
//! models, voice changing and audio isolation on top of a shared
//! [`HttpTransport`]. Every call takes a [`CancellationToken`]; audio comes
//! back as an [`AudioStream`] that is consumed as it arrives.

mod client;
pub mod service;
pub mod types;

pub use client::ElevenLabsClient;
pub use elevenlabs_config::{ClientConfig, ConfigError};
pub use elevenlabs_core::{
    ApiError, AudioStream, AudioUpload, CancellationToken, ElevenLabsError, ErrorKind, HttpTransport, Result,
};
pub use service::{
    AudioIsolationService, ModelService, SpeechToTextService, TextToSpeechService, VoiceChangerService, VoiceService,
};
pub use types::*;
