use a2a_host_core::{ChatRequest, ChatResponse, CoreError, HealthResponse, ServiceInfo, StreamFrame};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response body: {0}")]
    Shape(String),
    #[error("bad stream frame: {0}")]
    Frame(#[from] CoreError),
    #[error("stream read failed: {0}")]
    Stream(String),
}

/// HTTP client for the host's public endpoints.
#[derive(Debug, Clone)]
pub struct HostClient {
    http_client: HttpClient,
    base_url: Url,
}

impl HostClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http_client: HttpClient::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http_client.get(self.url("/health")).send().await?;
        let body: Value = checked(response).await?.json().await?;
        serde_json::from_value(body.clone())
            .map_err(|e| ClientError::Shape(format!("{e} in {body}")))
    }

    pub async fn info(&self) -> Result<ServiceInfo, ClientError> {
        let response = self.http_client.get(self.url("/")).send().await?;
        let body: Value = checked(response).await?.json().await?;
        serde_json::from_value(body.clone())
            .map_err(|e| ClientError::Shape(format!("{e} in {body}")))
    }

    pub async fn chat(&self, message: &str) -> Result<ChatResponse, ClientError> {
        let response = self
            .http_client
            .post(self.url("/chat"))
            .json(&ChatRequest::new(message))
            .send()
            .await?;
        let body: Value = checked(response).await?.json().await?;
        serde_json::from_value(body.clone())
            .map_err(|e| ClientError::Shape(format!("{e} in {body}")))
    }

    /// Read a whole `/chat/stream` response as frames.
    pub async fn chat_stream(&self, message: &str) -> Result<Vec<StreamFrame>, ClientError> {
        let response = self
            .http_client
            .post(self.url("/chat/stream"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&ChatRequest::new(message))
            .send()
            .await?;
        let response = checked(response).await?;

        let mut events = response.bytes_stream().eventsource();
        let mut frames = Vec::new();
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| ClientError::Stream(e.to_string()))?;
            log::debug!("frame: {}", event.data);
            frames.push(StreamFrame::from_json(&event.data)?);
        }
        Ok(frames)
    }
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}
