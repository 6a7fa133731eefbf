//! `data:` framing of stream records.
//!
//! Each frame is one JSON object followed by a blank line:
//! ```text
//! data: {"type":"tool_call","name":"send_message","arguments":{...}}\n\n
//! ```
//!
//! A payload spanning several lines gets one `data: ` prefix per line.

use crate::error::{EncodeError, EncodeResult};
use a2a_host_core::StreamFrame;
use bytes::Bytes;

/// Maximum serialized frame size (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

const PREFIX: &str = "data: ";

/// Encode a frame.
///
/// # Errors
///
/// Returns [`EncodeError::Json`] if serialization fails and
/// [`EncodeError::FrameTooLarge`] if the JSON exceeds [`MAX_FRAME_SIZE`].
pub fn encode(frame: &StreamFrame) -> EncodeResult<Bytes> {
    let json = serde_json::to_string(frame)
        .map_err(|e| EncodeError::json(frame.frame_type().as_str(), e))?;
    frame_payload(&json)
}

fn frame_payload(json: &str) -> EncodeResult<Bytes> {
    if json.len() > MAX_FRAME_SIZE {
        return Err(EncodeError::FrameTooLarge {
            size: json.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let mut output = String::with_capacity(PREFIX.len() + json.len() + 2);
    if json.contains('\n') {
        for line in json.lines() {
            output.push_str(PREFIX);
            output.push_str(line);
            output.push('\n');
        }
        output.push('\n');
    } else {
        output.push_str(PREFIX);
        output.push_str(json);
        output.push_str("\n\n");
    }

    Ok(Bytes::from(output))
}
