//! Contract with the agent runtime.
//!
//! The host depends on exactly two capabilities of the runtime:
//!
//! 1. **[`SessionService`]** - create (and look up) a session by its
//!    [`SessionKey`] triple
//! 2. **[`AgentRunner`]** - run one user message against a session,
//!    producing an asynchronous sequence of [`Event`]s
//!
//! Two implementations ship with the crate: [`AdkHttpRunner`], which talks
//! to an agent runtime over HTTP, and [`ScriptedRunner`], an in-process
//! runner used for local smoke runs and tests.

mod adk;
mod scripted;

pub use adk::{AdkHttpRunner, AdkHttpRunnerBuilder};
pub use scripted::{ScriptStep, ScriptedRunner};

use crate::config::{HostConfig, RunnerKind};
use crate::context::RunContext;
use crate::error::HostResult;
use crate::session::{InMemorySessionService, Session};
use a2a_host_core::{Content, Event, SessionKey};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;
use std::time::Duration;

/// Events produced by one runner invocation.
pub type EventStream = BoxStream<'static, HostResult<Event>>;

/// The agent runtime entry point.
///
/// # Error Handling
///
/// - Return `Err` from `run` when the invocation cannot start
/// - Yield `Err` items when the run fails after events started flowing
///
/// The host stops reading the stream after the first final event, so
/// implementations must tolerate being dropped mid-sequence.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run `new_message` against `session`, producing a stream of events.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be started.
    async fn run(
        &self,
        session: &SessionKey,
        new_message: Content,
        ctx: RunContext,
    ) -> HostResult<EventStream>;

    /// Optional initialization hook, called once before serving.
    async fn init(&self) -> HostResult<()> {
        Ok(())
    }

    /// Optional shutdown hook, called after the server stops.
    async fn shutdown(&self) -> HostResult<()> {
        Ok(())
    }

    /// Runner name for logging.
    fn name(&self) -> &'static str {
        "runner"
    }
}

/// Session store of the agent runtime.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a session identified by `key`.
    ///
    /// # Errors
    ///
    /// Fails with `SessionError::AlreadyExists` when the key is taken.
    async fn create_session(&self, key: &SessionKey) -> HostResult<Session>;

    /// Look up a session, `None` when it does not exist.
    async fn get_session(&self, key: &SessionKey) -> HostResult<Option<Session>>;
}

/// The runner and session store selected by configuration.
#[derive(Clone)]
pub struct Runtime {
    pub runner: Arc<dyn AgentRunner>,
    pub sessions: Arc<dyn SessionService>,
}

impl Runtime {
    /// Build the runtime described by `config`.
    ///
    /// # Errors
    ///
    /// Fails when the runtime URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &HostConfig) -> HostResult<Self> {
        match config.runner {
            RunnerKind::Adk => {
                let runner = Arc::new(
                    AdkHttpRunner::builder()
                        .with_url_str(&config.runner_url)?
                        .with_connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                        .build()?,
                );
                Ok(Self {
                    runner: runner.clone(),
                    sessions: runner,
                })
            }
            RunnerKind::Echo => {
                let sessions = Arc::new(InMemorySessionService::new());
                Ok(Self {
                    runner: Arc::new(ScriptedRunner::echo(sessions.clone())),
                    sessions,
                })
            }
        }
    }
}
