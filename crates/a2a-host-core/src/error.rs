use thiserror::Error;

/// Failure to read one of the wire payloads this crate defines.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// A runtime event did not match the event schema.
    #[error("invalid runtime event: {source}")]
    Event {
        #[source]
        source: serde_json::Error,
    },

    /// A `data:` payload was not a known stream frame.
    #[error("invalid stream frame: {source}")]
    Frame {
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
