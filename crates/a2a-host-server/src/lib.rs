//! HTTP façade hosting a routing agent runtime.
//!
//! The service accepts a chat message, runs it through an agent runtime
//! against one fixed session, and reports the agent's tool activity and final
//! reply either aggregated (`POST /chat`) or as a stream of `data:` frames
//! (`POST /chat/stream`).
//!
//! # Architecture
//!
//! 1. **[`AgentRunner`]** and **[`SessionService`]** - the contract with the
//!    agent runtime; [`AdkHttpRunner`] speaks the runtime's HTTP API and
//!    [`ScriptedRunner`] runs in process
//! 2. **[`EventAdapter`]** - classifies events into tool frames and detects the
//!    first final response
//! 3. **[`FrameEncoder`]** - `data:` framing of stream records
//! 4. **[`integrations::axum`]** - router and handlers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use a2a_host_server::integrations::axum::HostRouter;
//! use a2a_host_server::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn serve() -> HostResult<()> {
//! let sessions = Arc::new(InMemorySessionService::new());
//! bootstrap_session(sessions.as_ref(), &SessionKey::default()).await;
//!
//! let app = HostRouter::new(Arc::new(ScriptedRunner::echo(sessions))).into_router();
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod config;
pub mod context;
pub mod encoder;
pub mod error;
pub mod integrations;
pub mod runner;
pub mod session;

pub use adapter::{collect_response, frame_stream, AdapterState, EventAdapter};
pub use config::{HostConfig, RunnerKind};
pub use context::{RequestMetadata, RunContext};
pub use encoder::{encode_sse, ContentType, FrameEncoder};
pub use error::{
    EncodeError, EncodeResult, HostError, HostResult, RunnerError, SessionError, TransportError,
};
pub use runner::{AdkHttpRunner, AgentRunner, EventStream, Runtime, ScriptStep, ScriptedRunner, SessionService};
pub use session::{bootstrap_session, InMemorySessionService, Session};

pub use a2a_host_core;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapter::{collect_response, frame_stream, EventAdapter};
    pub use crate::context::{RequestMetadata, RunContext};
    pub use crate::encoder::{ContentType, FrameEncoder};
    pub use crate::error::{HostError, HostResult, RunnerError, SessionError, TransportError};
    pub use crate::runner::{AgentRunner, EventStream, ScriptStep, ScriptedRunner, SessionService};
    pub use crate::session::{bootstrap_session, InMemorySessionService, Session};

    pub use a2a_host_core::{
        ChatRequest, ChatResponse, Content, Event, Part, SessionKey, StreamFrame, ToolCall,
        ToolResponse,
    };

    pub use async_trait::async_trait;
    pub use futures::stream::BoxStream;
}
