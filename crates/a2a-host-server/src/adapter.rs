//! Translation of a runner's event sequence into chat responses and frames.
//!
//! [`EventAdapter`] is a two-state machine:
//!
//! ```text
//! AwaitingEvent --(non-final event: emit tool frames)--> AwaitingEvent
//! AwaitingEvent --(first final event: emit tool frames + final frame)--> Terminal
//! ```
//!
//! Both drivers stop pulling from the runner once the adapter is terminal and
//! drop the runner's stream, so events a runner might emit after its first
//! final event are never read. Feeding an event into a terminal adapter is a
//! [`HostError::ProtocolViolation`].
//!
//! If the runner's stream ends while the adapter is still awaiting, the
//! adapter synthesizes an empty final response so that every stream carries
//! exactly one `final_response` frame.

use crate::error::{HostError, HostResult};
use crate::runner::EventStream;
use a2a_host_core::{ChatResponse, Event, StreamFrame, ToolCall, ToolResponse};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;

const NO_ESCALATION_MESSAGE: &str = "No specific message.";

/// State of an [`EventAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Waiting for the next event from the runner.
    AwaitingEvent,
    /// The final response has been produced.
    Terminal,
}

/// Classifies runner events into stream frames.
#[derive(Debug)]
pub struct EventAdapter {
    state: AdapterState,
    events_seen: usize,
}

impl EventAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AdapterState::AwaitingEvent,
            events_seen: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> AdapterState {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state == AdapterState::Terminal
    }

    /// Number of events observed so far.
    #[must_use]
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Classify one event.
    ///
    /// Returns its tool frames in part order, followed by the final-response
    /// frame when the event is final.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ProtocolViolation`] when the adapter is terminal.
    pub fn observe(&mut self, event: &Event) -> HostResult<Vec<StreamFrame>> {
        if self.is_terminal() {
            return Err(HostError::ProtocolViolation {
                violation: format!(
                    "event {} received after the final response",
                    event.id.as_deref().unwrap_or("<unnamed>")
                ),
            });
        }
        self.events_seen += 1;

        let mut frames = tool_frames(event);
        if event.is_final_response() {
            frames.push(StreamFrame::final_response(final_reply(event)));
            self.state = AdapterState::Terminal;
        }
        Ok(frames)
    }

    /// Close the adapter after the runner's stream ended.
    ///
    /// Returns an empty final response when no final event was seen.
    pub fn finish(&mut self) -> Option<StreamFrame> {
        if self.is_terminal() {
            return None;
        }
        tracing::warn!(
            events = self.events_seen,
            "runner stream ended without a final response"
        );
        self.state = AdapterState::Terminal;
        Some(StreamFrame::final_response(String::new()))
    }
}

impl Default for EventAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool call and tool response frames of an event, in part order.
#[must_use]
pub fn tool_frames(event: &Event) -> Vec<StreamFrame> {
    event
        .parts()
        .iter()
        .filter_map(|part| {
            if let Some(call) = &part.function_call {
                Some(StreamFrame::ToolCall(ToolCall::from_function_call(call)))
            } else {
                part.function_response
                    .as_ref()
                    .map(|response| StreamFrame::ToolResponse(ToolResponse::from_function_response(response)))
            }
        })
        .collect()
}

/// Reply text carried by a final event.
///
/// Text parts are concatenated; an escalation without content becomes
/// `Agent escalated: <message>`.
#[must_use]
pub fn final_reply(event: &Event) -> String {
    if event.has_parts() {
        return event.text_content();
    }
    if event.escalates() {
        let message = event
            .error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(NO_ESCALATION_MESSAGE);
        return format!("Agent escalated: {message}");
    }
    String::new()
}

/// Folds frames into a [`ChatResponse`].
#[derive(Debug, Default)]
pub struct ChatAccumulator {
    response: ChatResponse,
}

impl ChatAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: StreamFrame) {
        match frame {
            StreamFrame::ToolCall(call) => self.response.tool_calls.push(call),
            StreamFrame::ToolResponse(response) => self.response.tool_responses.push(response),
            StreamFrame::FinalResponse { response } => self.response.response = response,
            StreamFrame::Error { .. } => {}
        }
    }

    #[must_use]
    pub fn into_response(self) -> ChatResponse {
        self.response
    }
}

/// Consume events up to the first final one and aggregate them.
///
/// # Errors
///
/// Returns the first error yielded by the runner; no partial result is kept.
pub async fn collect_response(mut events: EventStream) -> HostResult<ChatResponse> {
    let mut adapter = EventAdapter::new();
    let mut accumulator = ChatAccumulator::new();

    while let Some(event) = events.next().await {
        let event = event?;
        for frame in adapter.observe(&event)? {
            accumulator.record(frame);
        }
        if adapter.is_terminal() {
            break;
        }
    }
    drop(events);

    if let Some(frame) = adapter.finish() {
        accumulator.record(frame);
    }

    let response = accumulator.into_response();
    tracing::debug!(
        events = adapter.events_seen(),
        tool_calls = response.tool_calls.len(),
        tool_responses = response.tool_responses.len(),
        "chat response assembled"
    );
    Ok(response)
}

struct FrameCursor {
    events: Option<EventStream>,
    adapter: EventAdapter,
    pending: VecDeque<StreamFrame>,
}

impl FrameCursor {
    fn close_with(&mut self, frame: StreamFrame) {
        self.pending.push_back(frame);
        self.events = None;
    }
}

/// Turn a runner's events into stream frames.
///
/// The output ends with exactly one `final_response` frame, or with exactly
/// one `error` frame when the runner fails.
#[must_use]
pub fn frame_stream(events: EventStream) -> BoxStream<'static, StreamFrame> {
    let cursor = FrameCursor {
        events: Some(events),
        adapter: EventAdapter::new(),
        pending: VecDeque::new(),
    };

    stream::unfold(cursor, |mut cursor| async move {
        loop {
            if let Some(frame) = cursor.pending.pop_front() {
                return Some((frame, cursor));
            }
            let events = cursor.events.as_mut()?;

            match events.next().await {
                Some(Ok(event)) => match cursor.adapter.observe(&event) {
                    Ok(frames) => {
                        cursor.pending.extend(frames);
                        if cursor.adapter.is_terminal() {
                            cursor.events = None;
                        }
                    }
                    Err(err) => cursor.close_with(error_frame(&err)),
                },
                Some(Err(err)) => cursor.close_with(error_frame(&err)),
                None => {
                    let frame = cursor.adapter.finish();
                    cursor.events = None;
                    cursor.pending.extend(frame);
                }
            }
        }
    })
    .boxed()
}

/// Frames for a run that failed before producing a stream.
#[must_use]
pub fn failed_stream(err: &HostError) -> BoxStream<'static, StreamFrame> {
    stream::once(futures::future::ready(error_frame(err))).boxed()
}

fn error_frame(err: &HostError) -> StreamFrame {
    tracing::error!(code = err.code(), error = %err, "chat stream failed");
    StreamFrame::error(err.to_string())
}
