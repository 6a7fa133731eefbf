use crate::types::chat::{ToolCall, ToolResponse};
use serde::{Deserialize, Serialize};

/// Frame types of the streaming chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    ToolCall,
    ToolResponse,
    FinalResponse,
    Error,
}

impl FrameType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FrameType::ToolCall => "tool_call",
            FrameType::ToolResponse => "tool_response",
            FrameType::FinalResponse => "final_response",
            FrameType::Error => "error",
        }
    }
}

/// One record of the `POST /chat/stream` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    ToolCall(ToolCall),
    ToolResponse(ToolResponse),
    FinalResponse { response: String },
    Error { error: String },
}

impl StreamFrame {
    pub fn final_response(response: impl Into<String>) -> Self {
        StreamFrame::FinalResponse {
            response: response.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        StreamFrame::Error {
            error: error.into(),
        }
    }

    pub fn frame_type(&self) -> FrameType {
        match self {
            StreamFrame::ToolCall(_) => FrameType::ToolCall,
            StreamFrame::ToolResponse(_) => FrameType::ToolResponse,
            StreamFrame::FinalResponse { .. } => FrameType::FinalResponse,
            StreamFrame::Error { .. } => FrameType::Error,
        }
    }

    /// Final and error frames end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamFrame::FinalResponse { .. } | StreamFrame::Error { .. }
        )
    }

    /// Parses the JSON payload of one `data:` line.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(|source| crate::CoreError::Frame { source })
    }
}
