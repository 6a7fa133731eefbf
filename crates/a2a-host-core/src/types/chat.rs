use crate::JsonValue;
use crate::event::{FunctionCall, FunctionResponse};
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Body of `POST /chat` and `POST /chat/stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A tool invocation observed in the agent's event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    /// The whole function-call record (`id`, `args`, `name`), absent fields omitted.
    pub arguments: JsonValue,
}

impl ToolCall {
    pub fn from_function_call(call: &FunctionCall) -> Self {
        let mut record = Map::new();
        if let Some(id) = &call.id {
            record.insert("id".to_string(), JsonValue::String(id.clone()));
        }
        if let Some(args) = &call.args {
            record.insert("args".to_string(), JsonValue::Object(args.clone()));
        }
        record.insert("name".to_string(), JsonValue::String(call.name.clone()));

        Self {
            name: call.name.clone(),
            arguments: JsonValue::Object(record),
        }
    }
}

/// A tool result observed in the agent's event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub name: String,
    pub response: JsonValue,
}

impl ToolResponse {
    /// Builds the record, unwrapping `{"response": X, ..}` payloads to `X`.
    pub fn from_function_response(response: &FunctionResponse) -> Self {
        let payload = match &response.response {
            JsonValue::Object(map) if map.contains_key("response") => map["response"].clone(),
            other => other.clone(),
        };

        Self {
            name: response.name.clone(),
            response: payload,
        }
    }
}

/// Aggregated reply of `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub tool_responses: Vec<ToolResponse>,
}
