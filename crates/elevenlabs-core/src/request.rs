use std::path::Path;

use bytes::Bytes;
use futures::TryStream;
use reqwest::{
    Method, RequestBuilder,
    multipart::{Form, Part},
};
use serde::Serialize;

use crate::error::{ElevenLabsError, Result};

/// Multipart field the audio is sent under
pub const AUDIO_FIELD_NAME: &str = "audio";

/// File name reported for uploaded audio
pub const AUDIO_FILE_NAME: &str = "audio.mp3";

/// Content type reported for uploaded audio
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// A single outbound API call
///
/// Built per call and consumed by [`HttpTransport::send`](crate::HttpTransport::send).
#[derive(Debug)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) accept: Option<&'static str>,
    pub(crate) body: RequestBody,
}

impl ApiRequest {
    /// Request `path` (relative to the configured base URL) with `method`
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            accept: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter; values are percent-encoded on send
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Override the default `Accept: application/json`
    #[must_use]
    pub const fn accept(mut self, mime: &'static str) -> Self {
        self.accept = Some(mime);
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::InvalidArgument`] if `value` cannot be
    /// encoded as JSON
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.body(RequestBody::json(value)?))
    }

    /// Attach an audio upload as a single multipart part
    #[must_use]
    pub fn multipart(self, upload: AudioUpload) -> Self {
        self.body(RequestBody::Multipart(upload))
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Request payload
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document, sent as `application/json`
    Json(serde_json::Value),
    /// One binary part in a `multipart/form-data` form
    Multipart(AudioUpload),
}

impl RequestBody {
    /// Encode `value` as a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::InvalidArgument`] if serialization fails
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ElevenLabsError::InvalidArgument(format!("failed to encode request body: {e}")))
    }

    pub(crate) fn apply(self, builder: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            Self::Empty => Ok(builder),
            Self::Json(value) => Ok(builder.json(&value)),
            Self::Multipart(upload) => Ok(builder.multipart(upload.into_form()?)),
        }
    }
}

impl From<AudioUpload> for RequestBody {
    fn from(upload: AudioUpload) -> Self {
        Self::Multipart(upload)
    }
}

/// Audio sent to an upload endpoint
///
/// The source is streamed into the request body; it is never collected
/// into memory by the client.
#[derive(Debug)]
pub struct AudioUpload {
    body: reqwest::Body,
    length: Option<u64>,
    field_name: String,
    file_name: String,
    content_type: String,
}

impl AudioUpload {
    fn with_body(body: reqwest::Body, length: Option<u64>) -> Self {
        Self {
            body,
            length,
            field_name: AUDIO_FIELD_NAME.to_owned(),
            file_name: AUDIO_FILE_NAME.to_owned(),
            content_type: AUDIO_CONTENT_TYPE.to_owned(),
        }
    }

    /// Upload audio that is already in memory
    pub fn from_bytes(audio: impl Into<Bytes>) -> Self {
        let audio = audio.into();
        let length = audio.len() as u64;
        Self::with_body(reqwest::Body::from(audio), Some(length))
    }

    /// Upload from an open file, read as the request is written
    pub fn from_file(file: tokio::fs::File) -> Self {
        Self::with_body(reqwest::Body::from(file), None)
    }

    /// Upload from any stream of byte chunks
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: TryStream + Send + Sync + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        Self::with_body(reqwest::Body::wrap_stream(stream), None)
    }

    /// Open `path` for upload, keeping its file name
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::InvalidArgument`] if the file cannot be opened
    pub async fn open(path: &Path) -> Result<Self> {
        let unreadable =
            |e: std::io::Error| ElevenLabsError::InvalidArgument(format!("cannot read {}: {e}", path.display()));

        let file = tokio::fs::File::open(path).await.map_err(unreadable)?;
        let length = file.metadata().await.map_err(unreadable)?.len();

        let mut upload = Self::with_body(reqwest::Body::from(file), Some(length));

        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            upload.file_name = name.to_owned();
        }

        Ok(upload)
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    fn into_form(self) -> Result<Form> {
        let Self {
            body,
            length,
            field_name,
            file_name,
            content_type,
        } = self;

        let part = match length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        };

        let part = part
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| ElevenLabsError::InvalidArgument(format!("invalid content type `{content_type}`: {e}")))?;

        Ok(Form::new().part(field_name, part))
    }
}
