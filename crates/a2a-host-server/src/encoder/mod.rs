//! Frame encoding for the streaming chat endpoint.
//!
//! Frames always use `data:` framing. Only the declared media type is
//! negotiated via the Accept header:
//!
//! - `text/event-stream` (default)
//! - `text/plain`, when asked for without `text/event-stream`
//!
//! # Example
//!
//! ```rust
//! use a2a_host_server::encoder::FrameEncoder;
//! use a2a_host_core::StreamFrame;
//!
//! let encoder = FrameEncoder::from_accept("text/event-stream");
//! let bytes = encoder.encode(&StreamFrame::final_response("hi")).expect("encoding failed");
//!
//! assert!(bytes.starts_with(b"data: "));
//! assert!(bytes.ends_with(b"\n\n"));
//! ```

mod sse;

pub use sse::{encode as encode_sse, MAX_FRAME_SIZE};

use crate::error::EncodeResult;
use a2a_host_core::StreamFrame;
use bytes::Bytes;

/// Media types the stream can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// `text/event-stream`.
    #[default]
    EventStream,
    /// `text/plain`, for clients that read the body as raw text.
    PlainText,
}

impl ContentType {
    /// Pick the media type for an Accept header value.
    ///
    /// ```rust
    /// use a2a_host_server::encoder::ContentType;
    ///
    /// assert_eq!(ContentType::from_accept("*/*"), ContentType::EventStream);
    /// assert_eq!(ContentType::from_accept("text/plain"), ContentType::PlainText);
    /// ```
    #[must_use]
    pub fn from_accept(accept: &str) -> Self {
        let accept = accept.to_ascii_lowercase();
        if accept.contains("text/plain") && !accept.contains("text/event-stream") {
            ContentType::PlainText
        } else {
            ContentType::EventStream
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContentType::EventStream => "text/event-stream",
            ContentType::PlainText => "text/plain; charset=utf-8",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Encoder for one streaming response.
#[derive(Debug, Clone, Default)]
pub struct FrameEncoder {
    content_type: ContentType,
}

impl FrameEncoder {
    #[must_use]
    pub fn from_accept(accept: &str) -> Self {
        Self {
            content_type: ContentType::from_accept(accept),
        }
    }

    /// Value for the Content-Type response header.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.content_type.as_str()
    }

    /// Encode one frame.
    ///
    /// # Errors
    ///
    /// Fails when the frame cannot be serialized or exceeds [`MAX_FRAME_SIZE`].
    pub fn encode(&self, frame: &StreamFrame) -> EncodeResult<Bytes> {
        sse::encode(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_stream_is_the_default() {
        assert_eq!(ContentType::from_accept(""), ContentType::EventStream);
        assert_eq!(ContentType::from_accept("*/*"), ContentType::EventStream);
        assert_eq!(ContentType::from_accept("application/json"), ContentType::EventStream);
        assert_eq!(
            ContentType::from_accept("text/plain, text/event-stream"),
            ContentType::EventStream
        );
        assert_eq!(FrameEncoder::default().content_type(), "text/event-stream");
    }

    #[test]
    fn plain_text_when_requested_alone() {
        let encoder = FrameEncoder::from_accept("Text/Plain;q=0.9");
        assert_eq!(encoder.content_type(), ContentType::PlainText.as_str());
        assert_eq!(encoder.content_type(), "text/plain; charset=utf-8");
    }

    #[test]
    fn framing_does_not_depend_on_media_type() {
        let frame = StreamFrame::final_response("same");
        assert_eq!(
            FrameEncoder::from_accept("text/plain").encode(&frame).unwrap(),
            FrameEncoder::default().encode(&frame).unwrap()
        );
    }
}
