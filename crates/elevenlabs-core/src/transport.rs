use std::{fmt, time::Duration};

use elevenlabs_config::{ClientConfig, ConfigError};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    classify::classify,
    error::{ElevenLabsError, Result},
    request::{ApiRequest, RequestBody},
    response::ApiResponse,
};

/// Header carrying the API key
const API_KEY_HEADER: &str = "xi-api-key";

const USER_AGENT: &str = concat!("elevenlabs-rs/", env!("CARGO_PKG_VERSION"));

/// Most of an error body kept for classification
pub(crate) const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// HTTP transport for the `ElevenLabs` API
///
/// Owns a pooled `reqwest` client with the API key installed as a default
/// header. Every response is checked before it is returned: non-2xx
/// statuses come back as a classified [`ApiError`](crate::ApiError), so a
/// returned [`ApiResponse`] is always a success.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Validate `config` and build the transport
    ///
    /// # Errors
    ///
    /// Returns [`ElevenLabsError::Config`] if the configuration is invalid
    /// or the HTTP client cannot be built. No request is issued either way.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.endpoint()?;
        let timeout = config.timeout();

        let mut api_key =
            HeaderValue::from_str(config.api_key.expose_secret()).map_err(|_| ConfigError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_nodelay(true)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        tracing::debug!(base_url = %base_url, timeout_secs = timeout.as_secs(), "ElevenLabs transport ready");

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// Base URL request paths are resolved against
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Timeout applied to each request
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one request
    ///
    /// The timeout covers connecting, sending, receiving the response head,
    /// and reading the body of an error response. Cancelling `cancel`
    /// aborts the call with [`ElevenLabsError::Cancelled`], which takes
    /// precedence over a response that is ready at the same moment.
    ///
    /// # Errors
    ///
    /// - [`ElevenLabsError::Api`] for non-2xx responses and network faults
    /// - [`ElevenLabsError::Timeout`] when the timeout expires
    /// - [`ElevenLabsError::Cancelled`] when `cancel` fires
    /// - [`ElevenLabsError::InvalidArgument`] for unusable paths or bodies
    pub async fn send(&self, request: ApiRequest, cancel: &CancellationToken) -> Result<ApiResponse> {
        if cancel.is_cancelled() {
            return Err(ElevenLabsError::Cancelled);
        }

        let ApiRequest {
            method,
            path,
            query,
            accept,
            body,
        } = request;

        let url = self.resolve(&path, &query)?;

        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        let builder = body.apply(builder)?;

        tracing::debug!(%method, %url, "sending ElevenLabs request");

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| ElevenLabsError::from_transport(e, self.timeout))?;

            ensure_success(response).await
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ElevenLabsError::Cancelled),
            result = tokio::time::timeout(self.timeout, exchange) => match result {
                Ok(result) => result,
                Err(_) => Err(ElevenLabsError::Timeout { after: self.timeout }),
            },
        };

        match outcome {
            Ok(response) => {
                tracing::debug!(%method, %url, status = response.status().as_u16(), "ElevenLabs request succeeded");
                Ok(ApiResponse::new(response, cancel.clone(), self.timeout))
            }
            Err(ElevenLabsError::Cancelled) => {
                tracing::debug!(%method, %url, "ElevenLabs request cancelled");
                Err(ElevenLabsError::Cancelled)
            }
            Err(ElevenLabsError::Api(e)) if !e.is_connection_failure() => Err(e.into()),
            Err(e) => {
                tracing::warn!(%method, %url, "ElevenLabs request failed: {e}");
                Err(e)
            }
        }
    }

    /// `GET path` with no body
    pub async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path), cancel).await
    }

    /// `POST path` with `body`
    pub async fn post(&self, path: &str, body: RequestBody, cancel: &CancellationToken) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path).body(body), cancel).await
    }

    /// `DELETE path` with no body
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path), cancel).await
    }

    fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ElevenLabsError::InvalidArgument(format!("invalid request path `{path}`: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Pass 2xx responses through, classify everything else
///
/// Redirects are not followed, so a 3xx lands here as well.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = read_error_body(response).await;
    let error = classify(status, &headers, &body);

    tracing::warn!(
        kind = %error.kind,
        status = status.as_u16(),
        error_code = error.error_code.as_deref().unwrap_or_default(),
        "ElevenLabs API returned an error"
    );

    Err(error.into())
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error body
///
/// A body that fails mid-read is classified on whatever arrived.
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();

    while body.len() < MAX_ERROR_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_ERROR_BODY_BYTES - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("failed to read error body: {e}");
                break;
            }
        }
    }

    String::from_utf8_lossy(&body).into_owned()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;
    use reqwest::StatusCode;
    use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{AudioUpload, ErrorKind};

    fn test_transport(server: &MockServer) -> HttpTransport {
        let config = ClientConfig::new("test-key")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_timeout_seconds(5);

        HttpTransport::new(&config).unwrap()
    }

    #[tokio::test]
    async fn get_returns_success_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/test"))
            .and(header("xi-api-key", "test-key"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let response = transport.get("test", &CancellationToken::new()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"success": true}));
    }

    #[tokio::test]
    async fn get_with_invalid_key_is_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/test"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"status":"error","message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let err = transport.get("test", &CancellationToken::new()).await.unwrap_err();

        let api = err.api_error().expect("classified error");
        assert_eq!(api.kind, ErrorKind::Authentication);
        assert_eq!(api.status, Some(401));
        assert_eq!(api.error_code.as_deref(), Some("error"));
        assert!(api.message.contains("Invalid API key"));
    }

    #[tokio::test]
    async fn post_rate_limited_carries_reset_time() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/test"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("reset-at", "2026-10-18T12:00:00Z")
                    .set_body_string(r#"{"status":"rate_limited","message":"Too many requests"}"#),
            )
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let body = RequestBody::json(&serde_json::json!({"test": "data"})).unwrap();
        let err = transport.post("test", body, &CancellationToken::new()).await.unwrap_err();

        let api = err.api_error().expect("classified error");
        let expected: jiff::Timestamp = "2026-10-18T12:00:00Z".parse().unwrap();
        assert_eq!(
            api.kind,
            ErrorKind::RateLimited {
                reset_at: Some(expected)
            }
        );
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/voices/abc/settings/edit"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"stability": 0.5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let body = RequestBody::json(&serde_json::json!({"stability": 0.5})).unwrap();
        let response = transport
            .post("/voices/abc/settings/edit", body, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn delete_returns_success_response() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/voices/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let response = transport.delete("voices/abc", &CancellationToken::new()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn send_encodes_query_and_accept() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice%201"))
            .and(query_param("output_format", "mp3_44100_128"))
            .and(query_param("note", "a&b c"))
            .and(header("accept", "audio/mpeg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let request = ApiRequest::post("text-to-speech/voice 1")
            .query("output_format", "mp3_44100_128")
            .query("note", "a&b c")
            .accept("audio/mpeg");

        let response = transport.send(request, &CancellationToken::new()).await.unwrap();
        assert_eq!(response.bytes().await.unwrap().as_ref(), b"ID3");
    }

    #[tokio::test]
    async fn classifies_each_status() {
        let server = MockServer::start().await;

        let cases = [
            (400, "validation"),
            (403, "authentication"),
            (404, "not_found"),
            (500, "server_error"),
            (502, "server_error"),
            (503, "server_error"),
            (504, "server_error"),
            (409, "generic"),
        ];

        for (status, _) in cases {
            Mock::given(method("GET"))
                .and(path(format!("/v1/status/{status}")))
                .respond_with(ResponseTemplate::new(status).set_body_string("failure"))
                .mount(&server)
                .await;
        }

        let transport = test_transport(&server);

        for (status, expected) in cases {
            let err = transport
                .get(&format!("status/{status}"), &CancellationToken::new())
                .await
                .unwrap_err();

            let api = err.api_error().expect("classified error");
            let label: &'static str = (&api.kind).into();
            assert_eq!(label, expected, "status {status}");
            assert_eq!(api.status, Some(status));
            assert_eq!(api.message, "failure");
        }
    }

    #[tokio::test]
    async fn uploads_single_multipart_part() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/speech-to-text"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains("name=\"audio\"; filename=\"audio.mp3\""))
            .and(body_string_contains("audio/mpeg"))
            .and(body_string_contains("fake-audio-payload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "hi"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let upload = AudioUpload::from_bytes(&b"fake-audio-payload"[..]);
        let response = transport
            .post("speech-to-text", upload.into(), &CancellationToken::new())
            .await
            .unwrap();

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["text"], "hi");
    }

    #[tokio::test]
    async fn uploads_from_stream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio-isolation/isolate-voice"))
            .and(body_string_contains("chunk-one|chunk-two"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clean".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let chunks = futures::stream::iter(vec![
            Ok::<_, std::io::Error>(bytes::Bytes::from_static(b"chunk-one|")),
            Ok(bytes::Bytes::from_static(b"chunk-two")),
        ]);

        let transport = test_transport(&server);
        let response = transport
            .post(
                "audio-isolation/isolate-voice",
                AudioUpload::from_stream(chunks).into(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.bytes().await.unwrap().as_ref(), b"clean");
    }

    #[tokio::test]
    async fn streams_download_body() {
        let server = MockServer::start().await;
        let audio: Vec<u8> = (0..=255_u8).cycle().take(64 * 1024).collect();

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/abc/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(audio.clone()),
            )
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let response = transport
            .send(ApiRequest::post("text-to-speech/abc/stream"), &CancellationToken::new())
            .await
            .unwrap();

        let mut stream = response.into_stream();
        assert_eq!(stream.content_type(), Some("audio/mpeg"));

        let mut received = Vec::new();
        while let Some(chunk) = stream.next().await {
            received.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(received, audio);
    }

    #[tokio::test]
    async fn stream_reader_yields_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/audio"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"riff-data".to_vec()))
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let response = transport.get("audio", &CancellationToken::new()).await.unwrap();

        let mut reader = response.into_stream().into_reader();
        let mut out = Vec::new();
        tokio::io::copy(&mut reader, &mut out).await.unwrap();

        assert_eq!(out, b"riff-data");
    }

    #[tokio::test]
    async fn cancelled_stream_ends_with_cancelled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/audio"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 1024]))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let transport = test_transport(&server);
        let response = transport.get("audio", &cancel).await.unwrap();

        let mut stream = response.into_stream();
        cancel.cancel();

        assert!(matches!(stream.next().await, Some(Err(ElevenLabsError::Cancelled))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn undecodable_success_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let response = transport.get("models", &CancellationToken::new()).await.unwrap();
        let err = response.json::<serde_json::Value>().await.unwrap_err();

        assert!(matches!(err, ElevenLabsError::Decode(_)));
    }

    #[tokio::test]
    async fn cancellation_wins_over_in_flight_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = transport.get("slow", &cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(err.api_error().is_none());
    }

    #[tokio::test]
    async fn already_cancelled_token_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = transport.get("anything", &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn configured_timeout_is_distinct_outcome() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = ClientConfig::new("test-key")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_timeout_seconds(1);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.get("slow", &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ElevenLabsError::Timeout { after } if after == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn unreachable_host_is_connection_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::new("test-key").with_base_url(format!("http://{address}/v1"));
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.get("voices", &CancellationToken::new()).await.unwrap_err();

        let api = err.api_error().expect("classified error");
        assert_eq!(api.kind, ErrorKind::ServerError);
        assert!(api.is_connection_failure());
        assert!(api.status.is_none());
        assert!(std::error::Error::source(api).is_some());
    }

    #[tokio::test]
    async fn invalid_config_issues_no_requests() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let invalid = [
            ClientConfig::new("").with_base_url(server.uri()),
            ClientConfig::new("test-key").with_base_url(""),
            ClientConfig::new("test-key").with_base_url(server.uri()).with_timeout_seconds(0),
        ];

        for config in invalid {
            let err = HttpTransport::new(&config).unwrap_err();
            assert!(matches!(err, ElevenLabsError::Config(_)));
        }
    }

    #[test]
    fn api_key_with_control_characters_is_rejected() {
        let err = HttpTransport::new(&ClientConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, ElevenLabsError::Config(ConfigError::InvalidApiKey)));
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let server = MockServer::start().await;
        let elsewhere = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/collect", elsewhere.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .expect(0)
            .mount(&elsewhere)
            .await;

        let transport = test_transport(&server);
        let err = transport.get("models", &CancellationToken::new()).await.unwrap_err();

        let api = err.api_error().expect("classified error");
        assert_eq!(api.kind, ErrorKind::Generic);
        assert_eq!(api.status, Some(302));

        let leaked = received_api_keys(&elsewhere).await;
        assert!(leaked.is_empty(), "key sent to another host: {leaked:?}");
    }

    async fn received_api_keys(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| request.headers.get("xi-api-key"))
            .filter_map(|value| value.to_str().ok().map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn oversized_error_body_is_truncated() {
        let server = MockServer::start().await;
        let page = "x".repeat(2 * 1024 * 1024);

        Mock::given(method("GET"))
            .and(path("/v1/voices"))
            .respond_with(ResponseTemplate::new(502).set_body_string(page))
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let err = transport.get("voices", &CancellationToken::new()).await.unwrap_err();

        let api = err.api_error().expect("classified error");
        assert_eq!(api.kind, ErrorKind::ServerError);
        assert_eq!(api.message.len(), MAX_ERROR_BODY_BYTES);
        assert!(api.message.bytes().all(|b| b == b'x'));
    }

    #[tokio::test]
    async fn small_error_body_is_kept_whole() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/voices"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let transport = test_transport(&server);
        let err = transport.get("voices", &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.api_error().unwrap().message, "boom");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let transport = HttpTransport::new(&ClientConfig::new("sk-super-secret")).unwrap();
        let rendered = format!("{transport:?}");

        assert!(rendered.contains("api.elevenlabs.io"));
        assert!(!rendered.contains("sk-super-secret"));
    }
}
