//! Per-request context handed to the agent runner.

use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// What a runner knows about the chat request it serves.
///
/// The streaming endpoint cancels the token once the response body is
/// dropped, i.e. when the client goes away. Runners that pull from a remote
/// runtime stop reading when [`RunContext::on_cancel`] resolves.
#[derive(Clone)]
pub struct RunContext {
    token: CancellationToken,
    metadata: Arc<RequestMetadata>,
}

impl RunContext {
    #[must_use]
    pub fn new(token: CancellationToken, metadata: RequestMetadata) -> Self {
        Self {
            token,
            metadata: Arc::new(metadata),
        }
    }

    /// A context outside any HTTP request, with its own token.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(CancellationToken::new(), RequestMetadata::default())
    }

    /// Resolves when the request is abandoned. Owns its token so it can be
    /// moved into a stream combinator.
    #[must_use]
    pub fn on_cancel(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.metadata.request_id
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("request_id", &self.metadata.request_id)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::detached()
    }
}

/// Request details kept for log correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Caller-supplied `x-request-id`, or a generated one; `"-"` outside HTTP.
    pub request_id: String,
    pub user_agent: Option<String>,
    /// Raw Accept header, used to pick the stream media type.
    pub accept: Option<String>,
}

impl RequestMetadata {
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_agent: None,
            accept: None,
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new("-")
    }
}
