//! Runner backed by an agent runtime's HTTP API.
//!
//! Sessions are created with
//! `POST {base}/apps/{app}/users/{user}/sessions/{session}`; runs are started
//! with `POST {base}/run_sse`, which answers with `data:` frames each holding
//! one camelCase event. A frame of the form `{"error": "..."}` reports a
//! failed run.

use super::{AgentRunner, EventStream, SessionService};
use crate::context::RunContext;
use crate::error::{HostError, HostResult, RunnerError, SessionError, TransportError};
use crate::internal_error;
use crate::session::Session;
use a2a_host_core::{Content, Event, SessionKey};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST /run_sse`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest<'a> {
    app_name: &'a str,
    user_id: &'a str,
    session_id: &'a str,
    new_message: &'a Content,
    streaming: bool,
}

/// Session record returned by the runtime.
#[derive(Debug, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    events: Vec<Event>,
}

pub struct AdkHttpRunner {
    http_client: HttpClient,
    base_url: Url,
    connect_timeout: Duration,
}

impl AdkHttpRunner {
    pub fn builder() -> AdkHttpRunnerBuilder {
        AdkHttpRunnerBuilder::new()
    }

    /// Build an endpoint URL below the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> HostResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| internal_error!("runtime URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn session_url(&self, key: &SessionKey) -> HostResult<Url> {
        self.endpoint(&[
            "apps",
            &key.app_name,
            "users",
            &key.user_id,
            "sessions",
            &key.session_id,
        ])
    }

    fn transport_error(&self, err: &reqwest::Error) -> HostError {
        let timeout_ms = u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX);
        TransportError::from_reqwest(err, timeout_ms).into()
    }
}

/// Decode the payload of one `data:` frame.
///
/// Returns `None` for empty keep-alive frames.
fn decode_frame(data: &str) -> Option<HostResult<Event>> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(source) => return Some(Err(RunnerError::Decode { source }.into())),
    };

    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map_or_else(|| error.to_string(), str::to_string);
        return Some(Err(RunnerError::stream(message).into()));
    }

    Some(serde_json::from_value(value).map_err(|source| RunnerError::Decode { source }.into()))
}

async fn read_error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    }
}

#[async_trait]
impl AgentRunner for AdkHttpRunner {
    async fn run(
        &self,
        session: &SessionKey,
        new_message: Content,
        ctx: RunContext,
    ) -> HostResult<EventStream> {
        let url = self.endpoint(&["run_sse"])?;
        let body = RunRequest {
            app_name: &session.app_name,
            user_id: &session.user_id,
            session_id: &session.session_id,
            new_message: &new_message,
            streaming: false,
        };

        tracing::debug!(request_id = ctx.request_id(), %url, session = %session, "starting runtime run");

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_body(response).await;
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let cancelled = ctx.on_cancel();
        let events = response
            .bytes_stream()
            .eventsource()
            .take_until(cancelled)
            .filter_map(|frame| async move {
                match frame {
                    Ok(frame) => decode_frame(&frame.data),
                    Err(e) => Some(Err(RunnerError::stream(e.to_string()).into())),
                }
            });

        Ok(events.boxed())
    }

    fn name(&self) -> &'static str {
        "adk-http-runner"
    }
}

#[async_trait]
impl SessionService for AdkHttpRunner {
    async fn create_session(&self, key: &SessionKey) -> HostResult<Session> {
        let response = self
            .http_client
            .post(self.session_url(key)?)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            let record: SessionRecord = response
                .json()
                .await
                .map_err(|e| SessionError::Backend {
                    reason: format!("invalid session record: {e}"),
                })?;
            return Ok(Session {
                key: key.clone(),
                events: record.events,
            });
        }

        let message = read_error_body(response).await;
        if status == StatusCode::BAD_REQUEST && message.contains("already exists") {
            return Err(SessionError::AlreadyExists { key: key.clone() }.into());
        }
        Err(TransportError::HttpStatus {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    async fn get_session(&self, key: &SessionKey) -> HostResult<Option<Session>> {
        let response = self
            .http_client
            .get(self.session_url(key)?)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                message: read_error_body(response).await,
            }
            .into());
        }

        let record: SessionRecord = response.json().await.map_err(|e| SessionError::Backend {
            reason: format!("invalid session record: {e}"),
        })?;
        Ok(Some(Session {
            key: key.clone(),
            events: record.events,
        }))
    }
}

/// Builder for [`AdkHttpRunner`].
#[derive(Debug, Clone)]
pub struct AdkHttpRunnerBuilder {
    base_url: Option<Url>,
    connect_timeout: Duration,
}

impl AdkHttpRunnerBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// # Errors
    ///
    /// Fails when `url` is not an absolute URL.
    pub fn with_url_str(self, url: &str) -> HostResult<Self> {
        let url = Url::parse(url).map_err(|e| {
            RunnerError::invocation_with_source(format!("invalid runtime URL '{url}'"), e)
        })?;
        Ok(self.with_url(url))
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// Fails when no URL was given or the HTTP client cannot be built.
    pub fn build(self) -> HostResult<AdkHttpRunner> {
        let base_url = self
            .base_url
            .ok_or_else(|| RunnerError::invocation("runtime URL is required"))?;

        let http_client = HttpClient::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| RunnerError::invocation_with_source("failed to build HTTP client", e))?;

        Ok(AdkHttpRunner {
            http_client,
            base_url,
            connect_timeout: self.connect_timeout,
        })
    }
}

impl Default for AdkHttpRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
