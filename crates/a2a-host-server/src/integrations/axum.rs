//! Axum integration: the HTTP surface of the host.
//!
//! # Endpoints
//!
//! - `GET /health` - fixed health record
//! - `GET /` - service metadata and endpoint map
//! - `POST /chat` - run one message, answer with the aggregated [`ChatResponse`]
//! - `POST /chat/stream` - run one message, answer with `data:` frames
//!
//! All routes share one runner and one session key. CORS is fully
//! permissive.
//!
//! ```rust,no_run
//! use a2a_host_server::integrations::axum::HostRouter;
//! use a2a_host_server::runner::ScriptedRunner;
//! use a2a_host_server::session::InMemorySessionService;
//! use std::sync::Arc;
//!
//! let runner = ScriptedRunner::echo(Arc::new(InMemorySessionService::new()));
//! let app = HostRouter::new(Arc::new(runner))
//!     .with_path_prefix("/api")
//!     .into_router();
//! ```

use crate::adapter::{collect_response, failed_stream, frame_stream};
use crate::config::DEFAULT_BODY_LIMIT_BYTES;
use crate::context::{RequestMetadata, RunContext};
use crate::encoder::FrameEncoder;
use crate::error::HostError;
use crate::runner::AgentRunner;
use a2a_host_core::{ChatRequest, ChatResponse, Content, HealthResponse, ServiceInfo, SessionKey, StreamFrame};
use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures::future;
use futures::stream::StreamExt;
use http::header::{ACCEPT, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Request, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::Instrument;

const ENCODING_FAILED_FRAME: &str = "data: {\"type\":\"error\",\"error\":\"encoding failed\"}\n\n";

/// Shared state of every handler.
#[derive(Clone)]
pub struct HostState {
    runner: Arc<dyn AgentRunner>,
    session: Arc<SessionKey>,
    info: Arc<ServiceInfo>,
    body_limit: usize,
}

/// Router builder for the host endpoints.
pub struct HostRouter {
    runner: Arc<dyn AgentRunner>,
    session: SessionKey,
    path_prefix: String,
    body_limit: usize,
}

impl HostRouter {
    pub fn new(runner: Arc<dyn AgentRunner>) -> Self {
        Self {
            runner,
            session: SessionKey::default(),
            path_prefix: String::new(),
            body_limit: DEFAULT_BODY_LIMIT_BYTES,
        }
    }

    /// Session every request runs against.
    #[must_use]
    pub fn with_session(mut self, session: SessionKey) -> Self {
        self.session = session;
        self
    }

    /// Mount all routes below `prefix`, which should start with `/` and not
    /// end with one.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn into_router(self) -> Router {
        let prefix = self.path_prefix;
        let state = HostState {
            runner: self.runner,
            session: Arc::new(self.session),
            info: Arc::new(ServiceInfo::with_prefix(&prefix)),
            body_limit: self.body_limit,
        };

        let root_path = if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.clone()
        };

        Router::new()
            .route(&root_path, get(info_handler))
            .route(&format!("{prefix}/health"), get(health_handler))
            .route(&format!("{prefix}/chat"), post(chat_handler))
            .route(&format!("{prefix}/chat/stream"), post(chat_stream_handler))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn info_handler(State(state): State<HostState>) -> Json<ServiceInfo> {
    Json(state.info.as_ref().clone())
}

/// Run one message and answer with the aggregated reply.
pub async fn chat_handler(
    State(state): State<HostState>,
    headers: HeaderMap,
    request: Request<Body>,
) -> Response {
    let metadata = RequestMetadata::from_headers(&headers);
    let span = request_span("chat", &metadata, &state.session);

    async move {
        let chat = match read_chat_request(request, state.body_limit).await {
            Ok(chat) => chat,
            Err(rejection) => return rejection,
        };
        tracing::info!(chars = chat.message.len(), "chat request");

        let ctx = RunContext::new(CancellationToken::new(), metadata);
        let result = match state
            .runner
            .run(&state.session, Content::user_text(chat.message), ctx)
            .await
        {
            Ok(events) => collect_response(events).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                tracing::info!(
                    tool_calls = response.tool_calls.len(),
                    tool_responses = response.tool_responses.len(),
                    "chat completed"
                );
                Json::<ChatResponse>(response).into_response()
            }
            Err(err) => {
                tracing::error!(code = err.code(), error = %err, "chat failed");
                host_error_response(&err)
            }
        }
    }
    .instrument(span)
    .await
}

/// Run one message and stream its frames.
///
/// Runner failures, including failures to start, become a single `error`
/// frame on a 200 response. Dropping the response body cancels the run.
pub async fn chat_stream_handler(
    State(state): State<HostState>,
    headers: HeaderMap,
    request: Request<Body>,
) -> Response {
    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/event-stream");
    let encoder = FrameEncoder::from_accept(accept);
    let metadata = RequestMetadata::from_headers(&headers);
    let span = request_span("chat_stream", &metadata, &state.session);

    async move {
        let chat = match read_chat_request(request, state.body_limit).await {
            Ok(chat) => chat,
            Err(rejection) => return rejection,
        };
        tracing::info!(chars = chat.message.len(), content_type = encoder.content_type(), "chat stream request");

        let cancel = CancellationToken::new();
        let ctx = RunContext::new(cancel.clone(), metadata);
        let frames = match state
            .runner
            .run(&state.session, Content::user_text(chat.message), ctx)
            .await
        {
            Ok(events) => frame_stream(events),
            Err(err) => failed_stream(&err),
        };

        let content_type = encoder.content_type();
        let guard = cancel.drop_guard();
        // A frame that cannot be encoded ends the body with its error frame.
        let body = frames.scan(false, move |stopped, frame| {
            let _alive = &guard;
            if *stopped {
                return future::ready(None);
            }
            let bytes = encode_frame(&encoder, &frame).unwrap_or_else(|fallback| {
                *stopped = true;
                fallback
            });
            future::ready(Some(Ok::<_, Infallible>(bytes)))
        });

        (
            StatusCode::OK,
            [
                (CONTENT_TYPE, content_type),
                (CACHE_CONTROL, "no-cache"),
                (CONNECTION, "keep-alive"),
            ],
            Body::from_stream(body),
        )
            .into_response()
    }
    .instrument(span)
    .await
}

fn request_span(route: &'static str, metadata: &RequestMetadata, session: &SessionKey) -> tracing::Span {
    tracing::info_span!(
        "request",
        route,
        request_id = %metadata.request_id,
        session_id = %session.session_id,
    )
}

async fn read_chat_request(request: Request<Body>, limit: usize) -> Result<ChatRequest, Response> {
    let bytes = axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| invalid_request(format!("failed to read request body: {e}")))?;

    serde_json::from_slice(&bytes).map_err(|e| invalid_request(format!("invalid request body: {e}")))
}

/// Encode one frame, or build the `error` frame that replaces it.
fn encode_frame(encoder: &FrameEncoder, frame: &StreamFrame) -> Result<Bytes, Bytes> {
    encoder.encode(frame).map_err(|err| {
        let err = HostError::from(err);
        tracing::error!(
            code = err.code(),
            frame_type = frame.frame_type().as_str(),
            error = %err,
            "frame encoding failed"
        );
        encoder
            .encode(&StreamFrame::error(err.to_string()))
            .unwrap_or_else(|_| Bytes::from_static(ENCODING_FAILED_FRAME.as_bytes()))
    })
}

/// HTTP status reported for a failed request.
#[must_use]
pub fn status_for(err: &HostError) -> StatusCode {
    match err {
        HostError::Transport(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn host_error_response(err: &HostError) -> Response {
    error_response(status_for(err), err.code(), err.to_string())
}

fn invalid_request(message: String) -> Response {
    tracing::warn!(%message, "rejected request");
    error_response(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = serde_json::json!({
        "error": message,
        "code": code,
    });
    (status, Json(body)).into_response()
}

impl RequestMetadata {
    /// Collect request metadata from headers.
    ///
    /// Uses `x-request-id` when present, a fresh UUID otherwise.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let request_id = header("x-request-id")
            .filter(|s| !s.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

        Self {
            request_id,
            user_agent: header(USER_AGENT.as_str()).map(str::to_string),
            accept: header(ACCEPT.as_str()).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::MAX_FRAME_SIZE;
    use crate::error::{HostResult, TransportError};
    use crate::runner::{EventStream, ScriptStep, ScriptedRunner, SessionService};
    use crate::session::InMemorySessionService;
    use a2a_host_core::{Event, FunctionCall, FunctionResponse};
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn scripted(steps: Vec<ScriptStep>) -> Router {
        let sessions = Arc::new(InMemorySessionService::new());
        sessions.create_session(&SessionKey::default()).await.unwrap();
        HostRouter::new(Arc::new(ScriptedRunner::new(sessions, steps))).into_router()
    }

    async fn echo() -> Router {
        let sessions = Arc::new(InMemorySessionService::new());
        sessions.create_session(&SessionKey::default()).await.unwrap();
        HostRouter::new(Arc::new(ScriptedRunner::echo(sessions))).into_router()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn text_body(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    struct UnreachableRunner;

    #[async_trait]
    impl AgentRunner for UnreachableRunner {
        async fn run(&self, _: &SessionKey, _: Content, _: RunContext) -> HostResult<EventStream> {
            Err(TransportError::ConnectionFailed {
                reason: "connection refused".into(),
            }
            .into())
        }
    }

    #[tokio::test]
    async fn health_is_fixed() {
        let response = echo()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "healthy", "service": "a2a-host-agent", "version": "1.0.0"})
        );
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let response = echo()
            .await
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let info = json_body(response).await;
        assert_eq!(info["service"], "A2A Host Agent API");
        assert_eq!(info["version"], "1.0.0");
        assert_eq!(info["endpoints"]["chat_stream"], "/chat/stream");
    }

    #[tokio::test]
    async fn prefixed_routes() {
        let sessions = Arc::new(InMemorySessionService::new());
        let app = HostRouter::new(Arc::new(ScriptedRunner::echo(sessions)))
            .with_path_prefix("/api")
            .into_router();

        let response = app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["endpoints"]["health"], "/api/health");
    }

    #[tokio::test]
    async fn chat_returns_echo_reply() {
        let response = echo()
            .await
            .oneshot(post_json("/chat", r#"{"message": "Hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"response": "Echo: Hello", "tool_calls": [], "tool_responses": []})
        );
    }

    #[tokio::test]
    async fn chat_ignores_unknown_fields_and_accepts_empty_message() {
        let response = echo()
            .await
            .oneshot(post_json("/chat", r#"{"message": "", "session_id": "other"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["response"], "Echo: ");
    }

    #[tokio::test]
    async fn chat_records_tool_activity() {
        let app = scripted(vec![
            ScriptStep::Emit(Event::function_call(
                "routing_agent",
                FunctionCall::new("send_message").with_args(json!({"agent_name": "Weather Agent"})),
            )),
            ScriptStep::Emit(Event::function_response(
                "routing_agent",
                FunctionResponse::new("send_message", json!({"response": "X", "other": "Y"})),
            )),
            ScriptStep::Emit(Event::text("routing_agent", "Sunny.")),
        ])
        .await;

        let body = json_body(app.oneshot(post_json("/chat", r#"{"message":"weather?"}"#)).await.unwrap()).await;
        assert_eq!(body["response"], "Sunny.");
        assert_eq!(
            body["tool_calls"][0],
            json!({"name": "send_message", "arguments": {"args": {"agent_name": "Weather Agent"}, "name": "send_message"}})
        );
        assert_eq!(body["tool_responses"][0], json!({"name": "send_message", "response": "X"}));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let response = echo()
            .await
            .oneshot(post_json("/chat", "not valid json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_REQUEST");

        let response = echo()
            .await
            .oneshot(post_json("/chat", r#"{"text": "missing message"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let sessions = Arc::new(InMemorySessionService::new());
        let app = HostRouter::new(Arc::new(ScriptedRunner::echo(sessions)))
            .with_body_limit(16)
            .into_router();

        let response = app
            .oneshot(post_json("/chat", r#"{"message": "this is far too long"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn runner_failure_is_500_with_code() {
        let app = scripted(vec![ScriptStep::Fail("model overloaded".into())]).await;
        let response = app.oneshot(post_json("/chat", r#"{"message":"hi"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["code"], "RUNNER_ERROR");
        assert!(body["error"].as_str().unwrap().contains("model overloaded"));
    }

    #[tokio::test]
    async fn missing_session_is_reported() {
        // Session never bootstrapped.
        let app = HostRouter::new(Arc::new(ScriptedRunner::echo(Arc::new(
            InMemorySessionService::new(),
        ))))
        .into_router();

        let response = app.oneshot(post_json("/chat", r#"{"message":"hi"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("Session not found"));
    }

    #[tokio::test]
    async fn transport_failure_is_502() {
        let app = HostRouter::new(Arc::new(UnreachableRunner)).into_router();
        let response = app.oneshot(post_json("/chat", r#"{"message":"hi"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["code"], "TRANSPORT_ERROR");
    }

    #[tokio::test]
    async fn stream_sets_headers_and_frames() {
        let response = echo()
            .await
            .oneshot(post_json("/chat/stream", r#"{"message":"Hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[CONNECTION], "keep-alive");

        assert_eq!(
            text_body(response).await,
            "data: {\"type\":\"final_response\",\"response\":\"Echo: Hi\"}\n\n"
        );
    }

    #[tokio::test]
    async fn stream_honours_plain_text_accept() {
        let mut request = post_json("/chat/stream", r#"{"message":"Hi"}"#);
        request
            .headers_mut()
            .insert(ACCEPT, "text/plain".parse().unwrap());

        let response = echo().await.oneshot(request).await.unwrap();
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn stream_start_failure_is_single_error_frame() {
        let app = HostRouter::new(Arc::new(UnreachableRunner)).into_router();
        let response = app
            .oneshot(post_json("/chat/stream", r#"{"message":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = text_body(response).await;
        assert_eq!(body.matches("data: ").count(), 1);
        assert!(body.contains("\"type\":\"error\""));
        assert!(body.contains("connection refused"));
    }

    fn oversized_tool_response() -> ScriptStep {
        let listings = "x".repeat(MAX_FRAME_SIZE + 10);
        ScriptStep::Emit(Event::function_response(
            "routing_agent",
            FunctionResponse::new("send_message", json!({ "response": listings })),
        ))
    }

    #[tokio::test]
    async fn oversized_frame_ends_stream_with_error() {
        let app = scripted(vec![
            oversized_tool_response(),
            ScriptStep::Emit(Event::text("routing_agent", "done")),
        ])
        .await;
        let response = app
            .oneshot(post_json("/chat/stream", r#"{"message":"find a place"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = text_body(response).await;
        assert_eq!(body.matches("data: ").count(), 1, "{body}");
        assert!(body.starts_with("data: {\"type\":\"error\""));
        assert!(!body.contains("final_response"));
    }

    #[test]
    fn encode_failure_reports_encoding_error() {
        let frame = StreamFrame::final_response("y".repeat(MAX_FRAME_SIZE));
        let fallback = encode_frame(&FrameEncoder::default(), &frame).unwrap_err();
        let text = std::str::from_utf8(&fallback).unwrap();

        assert!(text.contains("\"type\":\"error\""));
        assert!(text.contains("frame could not be encoded"), "{text}");
        assert!(text.ends_with("\n\n"));

        let small = StreamFrame::final_response("ok");
        assert!(encode_frame(&FrameEncoder::default(), &small).is_ok());
    }

    #[tokio::test]
    async fn cors_is_permissive() {
        let request = Request::get("/health")
            .header("origin", "http://example.com")
            .body(Body::empty())
            .unwrap();
        let response = echo().await.oneshot(request).await.unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn request_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "req-123".parse().unwrap());
        headers.insert("user-agent", "a2a-host-check/1.0".parse().unwrap());
        headers.insert("accept", "text/event-stream".parse().unwrap());

        let metadata = RequestMetadata::from_headers(&headers);
        assert_eq!(metadata.request_id, "req-123");
        assert_eq!(metadata.user_agent.as_deref(), Some("a2a-host-check/1.0"));
        assert_eq!(metadata.accept.as_deref(), Some("text/event-stream"));
    }

    #[test]
    fn request_id_is_generated_when_missing() {
        let metadata = RequestMetadata::from_headers(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&metadata.request_id).is_ok());
        assert_eq!(metadata.accept, None);
    }

    #[test]
    fn status_mapping() {
        let transport: HostError = TransportError::Timeout { duration_ms: 1 }.into();
        assert_eq!(status_for(&transport), StatusCode::BAD_GATEWAY);
        let violation = HostError::ProtocolViolation { violation: "late".into() };
        assert_eq!(status_for(&violation), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
