//! The check suite run against a live host.

use crate::client::{ClientError, HostClient};
use crate::report::{CheckResult, Report};
use a2a_host_core::{StreamFrame, SERVICE_ID};
use std::time::Duration;

/// Chat checks: display name and message.
pub const CHAT_CHECKS: [(&str, &str); 4] = [
    ("Simple greeting", "Hello, how are you?"),
    ("Weather query", "What's the weather like in New York today?"),
    ("Lodging query", "Find me an Airbnb in San Francisco for next weekend"),
    (
        "Complex query",
        "I'm planning a trip to Tokyo. Can you check the weather there and find me some accommodation options?",
    ),
];

const STREAM_CHECK_MESSAGE: &str = "What's the weather like in Tokyo?";

#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Pause between chat checks.
    pub pause: Duration,
    pub skip_stream: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            skip_stream: false,
        }
    }
}

/// Run every check against the host behind `client`.
///
/// Chat checks are skipped when the health check fails.
pub async fn run_suite(client: &HostClient, options: &SuiteOptions) -> Report {
    let mut report = Report::default();

    let health = check_health(client).await;
    let healthy = health.passed();
    report.push(health);
    report.push(check_root(client).await);

    if !healthy {
        log::error!("health check failed; is the service running at {}?", client.base_url());
        report.abort("health check failed");
        return report;
    }

    for (index, (name, message)) in CHAT_CHECKS.iter().enumerate() {
        if index > 0 && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }
        report.push(check_chat(client, name, message).await);
    }

    if !options.skip_stream {
        report.push(check_stream(client, "Streaming chat", STREAM_CHECK_MESSAGE).await);
    }

    report
}

pub async fn check_health(client: &HostClient) -> CheckResult {
    const NAME: &str = "Health";
    match client.health().await {
        Ok(health) if health.status == "healthy" && health.service == SERVICE_ID => {
            CheckResult::pass(NAME, format!("{} {}", health.service, health.version))
        }
        Ok(health) => CheckResult::fail(NAME, format!("unexpected health record: {health:?}")),
        Err(err) => failed(NAME, &err),
    }
}

pub async fn check_root(client: &HostClient) -> CheckResult {
    const NAME: &str = "Root info";
    match client.info().await {
        Ok(info) => {
            let missing: Vec<&str> = ["health", "chat", "chat_stream"]
                .into_iter()
                .filter(|name| !info.endpoints.contains_key(*name))
                .collect();
            if missing.is_empty() {
                CheckResult::pass(NAME, format!("{} {}", info.service, info.version))
            } else {
                CheckResult::fail(NAME, format!("missing endpoints: {}", missing.join(", ")))
            }
        }
        Err(err) => failed(NAME, &err),
    }
}

pub async fn check_chat(client: &HostClient, name: &str, message: &str) -> CheckResult {
    log::info!("chat check '{name}': {message}");
    match client.chat(message).await {
        Ok(chat) => {
            let detail = format!(
                "{} ({} tool calls, {} tool responses)",
                chat.response,
                chat.tool_calls.len(),
                chat.tool_responses.len()
            );
            for call in &chat.tool_calls {
                log::info!("tool call {}: {}", call.name, call.arguments);
            }
            for response in &chat.tool_responses {
                log::info!("tool response {}: {}", response.name, response.response);
            }
            CheckResult::pass(name, detail)
        }
        Err(err) => failed(name, &err),
    }
}

/// The stream must end with its only terminal frame.
pub async fn check_stream(client: &HostClient, name: &str, message: &str) -> CheckResult {
    match client.chat_stream(message).await {
        Ok(frames) => match verify_frames(&frames) {
            Ok(StreamFrame::FinalResponse { response }) => {
                CheckResult::pass(name, format!("{} frames, reply: {response}", frames.len()))
            }
            Ok(StreamFrame::Error { error }) => CheckResult::fail(name, format!("stream reported: {error}")),
            Ok(_) => CheckResult::fail(name, "stream ended on a tool frame"),
            Err(reason) => CheckResult::fail(name, reason),
        },
        Err(err) => failed(name, &err),
    }
}

/// Check that exactly one terminal frame exists and that it comes last.
pub fn verify_frames(frames: &[StreamFrame]) -> Result<&StreamFrame, String> {
    let Some(last) = frames.last() else {
        return Err("stream carried no frames".to_string());
    };
    let terminal = frames.iter().filter(|f| f.is_terminal()).count();
    if terminal != 1 || !last.is_terminal() {
        return Err(format!(
            "expected one terminal frame at the end, got {terminal} in {} frames",
            frames.len()
        ));
    }
    Ok(last)
}

fn failed(name: &str, err: &ClientError) -> CheckResult {
    log::warn!("check '{name}' failed: {err}");
    CheckResult::fail(name, err.to_string())
}
