pub mod error;
pub mod event;
pub mod types;

pub use error::{CoreError, Result};
pub use event::{Content, Event, EventActions, FunctionCall, FunctionResponse, Part};
pub use types::*;

/// Re-export to ensure the same type is used
pub use serde_json::Value as JsonValue;
