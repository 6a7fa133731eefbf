//! Event model of the agent runtime.
//!
//! Events are produced by the runtime while it processes one user message.
//! Field names follow the runtime's camelCase JSON; snake_case spellings are
//! accepted on input as well.

use crate::{CoreError, JsonValue};
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// A function (tool) invocation requested by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, JsonValue>>,
    #[serde(default)]
    pub name: String,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            args: None,
            name: name.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the call arguments. Non-object values are ignored.
    pub fn with_args(mut self, args: JsonValue) -> Self {
        if let JsonValue::Object(map) = args {
            self.args = Some(map);
        }
        self
    }
}

/// The result of a function (tool) invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub response: JsonValue,
}

impl FunctionResponse {
    pub fn new(name: impl Into<String>, response: JsonValue) -> Self {
        Self {
            id: None,
            name: name.into(),
            response,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// One part of a content block. At most one payload is normally set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(alias = "function_call", skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(alias = "function_response", skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            function_call: Some(call),
            ..Self::default()
        }
    }

    pub fn function_response(response: FunctionResponse) -> Self {
        Self {
            function_response: Some(response),
            ..Self::default()
        }
    }
}

/// A content block: a role plus ordered parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.into()),
            parts,
        }
    }

    /// A user message made of a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new("user", vec![Part::text(text)])
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self::new("model", parts)
    }
}

/// Side effects and control signals attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalate: Option<bool>,
    #[serde(alias = "skip_summarization", skip_serializing_if = "Option::is_none")]
    pub skip_summarization: Option<bool>,
    #[serde(alias = "transfer_to_agent", skip_serializing_if = "Option::is_none")]
    pub transfer_to_agent: Option<String>,
}

/// A unit emitted by the agent runtime while processing a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "invocation_id", skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
    #[serde(alias = "turn_complete", skip_serializing_if = "Option::is_none")]
    pub turn_complete: Option<bool>,
    #[serde(default)]
    pub actions: EventActions,
    #[serde(
        alias = "long_running_tool_ids",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub long_running_tool_ids: Vec<String>,
    #[serde(alias = "error_code", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(alias = "error_message", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Event {
    /// An event authored by `author` carrying the given parts.
    pub fn new(author: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            author: Some(author.into()),
            content: Some(Content::model(parts)),
            ..Self::default()
        }
    }

    pub fn text(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(author, vec![Part::text(text)])
    }

    pub fn function_call(author: impl Into<String>, call: FunctionCall) -> Self {
        Self::new(author, vec![Part::function_call(call)])
    }

    pub fn function_response(author: impl Into<String>, response: FunctionResponse) -> Self {
        Self::new(author, vec![Part::function_response(response)])
    }

    /// An escalation event without content.
    pub fn escalation(author: impl Into<String>, error_message: Option<String>) -> Self {
        Self {
            author: Some(author.into()),
            actions: EventActions {
                escalate: Some(true),
                ..EventActions::default()
            },
            error_message,
            ..Self::default()
        }
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = Some(partial);
        self
    }

    pub fn with_skip_summarization(mut self) -> Self {
        self.actions.skip_summarization = Some(true);
        self
    }

    /// Parses an event from its JSON representation.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(|source| CoreError::Event { source })
    }

    /// Content parts, empty when the event has no content.
    pub fn parts(&self) -> &[Part] {
        match &self.content {
            Some(content) => &content.parts,
            None => &[],
        }
    }

    pub fn has_parts(&self) -> bool {
        !self.parts().is_empty()
    }

    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts().iter().filter_map(|p| p.function_call.as_ref())
    }

    pub fn function_responses(&self) -> impl Iterator<Item = &FunctionResponse> {
        self.parts()
            .iter()
            .filter_map(|p| p.function_response.as_ref())
    }

    /// Concatenation of all text parts, in order.
    pub fn text_content(&self) -> String {
        self.parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    pub fn escalates(&self) -> bool {
        self.actions.escalate.unwrap_or(false)
    }

    /// Whether this event is the agent's final response for the turn.
    ///
    /// Events that skip summarization or report long-running tools are final.
    /// Otherwise an event is final when it is complete (not partial) and
    /// carries neither function calls nor function responses.
    pub fn is_final_response(&self) -> bool {
        if self.actions.skip_summarization.unwrap_or(false)
            || !self.long_running_tool_ids.is_empty()
        {
            return true;
        }
        self.function_calls().next().is_none()
            && self.function_responses().next().is_none()
            && !self.partial.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_event_is_final() {
        let event = Event::text("routing_agent", "Hello there");
        assert!(event.is_final_response());
        assert_eq!(event.text_content(), "Hello there");
    }

    #[test]
    fn partial_text_is_not_final() {
        let event = Event::text("routing_agent", "Hel").with_partial(true);
        assert!(!event.is_final_response());
    }

    #[test]
    fn tool_events_are_not_final() {
        let call = Event::function_call("routing_agent", FunctionCall::new("send_message"));
        assert!(!call.is_final_response());

        let response = Event::function_response(
            "routing_agent",
            FunctionResponse::new("send_message", json!({"response": "ok"})),
        );
        assert!(!response.is_final_response());
    }

    #[test]
    fn skip_summarization_makes_tool_response_final() {
        let event = Event::function_response(
            "routing_agent",
            FunctionResponse::new("lookup", json!({})),
        )
        .with_skip_summarization();
        assert!(event.is_final_response());
    }

    #[test]
    fn long_running_tools_make_event_final() {
        let mut event = Event::function_call("routing_agent", FunctionCall::new("book"));
        event.long_running_tool_ids.push("call-1".to_string());
        assert!(event.is_final_response());
    }

    #[test]
    fn escalation_without_content_is_final() {
        let event = Event::escalation("routing_agent", None);
        assert!(event.is_final_response());
        assert!(event.escalates());
        assert!(!event.has_parts());
    }

    #[test]
    fn parses_camel_case_runtime_json() {
        let raw = r#"{
            "id": "e-1",
            "invocationId": "inv-1",
            "author": "routing_agent",
            "content": {"role": "model", "parts": [
                {"functionCall": {"id": "c-1", "name": "send_message", "args": {"agent_name": "Weather Agent"}}}
            ]},
            "actions": {"skipSummarization": false},
            "longRunningToolIds": []
        }"#;

        let event = Event::from_json(raw).unwrap();
        let call = event.function_calls().next().unwrap();
        assert_eq!(call.name, "send_message");
        assert_eq!(call.id.as_deref(), Some("c-1"));
        assert_eq!(event.invocation_id.as_deref(), Some("inv-1"));
        assert!(!event.is_final_response());
    }

    #[test]
    fn parses_snake_case_runtime_json() {
        let raw = r#"{
            "content": {"parts": [{"function_response": {"name": "f", "response": {"response": 1}}}]},
            "actions": {"escalate": true},
            "error_message": "boom"
        }"#;

        let event = Event::from_json(raw).unwrap();
        assert_eq!(event.function_responses().count(), 1);
        assert_eq!(event.error_message.as_deref(), Some("boom"));
        assert!(event.escalates());
    }

    #[test]
    fn invalid_json_reports_core_error() {
        let err = Event::from_json("not json").unwrap_err();
        assert!(matches!(err, CoreError::Event { .. }));
        assert!(err.to_string().starts_with("invalid runtime event"));
    }

    #[test]
    fn function_call_serialization_omits_absent_fields() {
        let call = FunctionCall::new("get_weather");
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"name": "get_weather"})
        );

        let call = call.with_id("c-9").with_args(json!({"city": "Tokyo"}));
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"id": "c-9", "args": {"city": "Tokyo"}, "name": "get_weather"})
        );
    }
}
