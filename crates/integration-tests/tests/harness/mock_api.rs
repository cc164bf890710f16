//! Mock `ElevenLabs` server for streaming tests
//!
//! Serves text-to-speech audio in chunks. Everything after the first chunk
//! is held back until the test calls [`MockApi::release`], so a test can
//! observe the client consuming audio while the body is still in flight.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use elevenlabs_client::{ClientConfig, ElevenLabsClient};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Key the mock accepts
pub const API_KEY: &str = "integration-key";

pub struct MockApi {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockApiState>,
}

struct MockApiState {
    chunks: Vec<Bytes>,
    release: Notify,
    finished: AtomicBool,
    request_count: AtomicU32,
}

impl MockApi {
    /// Start a server that streams `chunks` for any voice
    pub async fn start(chunks: Vec<Bytes>) -> anyhow::Result<Self> {
        let state = Arc::new(MockApiState {
            chunks,
            release: Notify::new(),
            finished: AtomicBool::new(false),
            request_count: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/v1/text-to-speech/{voice_id}/stream", routing::post(handle_stream))
            .route("/v1/text-to-speech/{voice_id}", routing::post(handle_stream))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Client configured against this server
    pub fn client(&self) -> ElevenLabsClient {
        let config = ClientConfig::new(API_KEY)
            .with_base_url(self.base_url())
            .with_timeout_seconds(5);

        ElevenLabsClient::new(&config).unwrap()
    }

    /// Let the held-back chunks go out
    pub fn release(&self) {
        self.state.release.notify_one();
    }

    /// Whether the server has produced the whole body
    pub fn finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_stream(
    State(state): State<Arc<MockApiState>>,
    Path(_voice_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    if headers.get("xi-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"status": "invalid_api_key", "message": "Invalid API key"})),
        )
            .into_response();
    }

    let body = futures::stream::unfold((state, 0_usize), |(state, index)| async move {
        if index == state.chunks.len() {
            state.finished.store(true, Ordering::SeqCst);
            return None;
        }

        if index == 1 {
            state.release.notified().await;
        }

        let chunk = state.chunks[index].clone();
        Some((Ok::<_, Infallible>(chunk), (state, index + 1)))
    });

    ([(header::CONTENT_TYPE, "audio/mpeg")], Body::from_stream(body)).into_response()
}
