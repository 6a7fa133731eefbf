//! In-process runner that replays a fixed script.
//!
//! [`ScriptedRunner::echo`] backs the `echo` runner mode, which lets the
//! service be exercised end to end without an agent runtime.

use super::{AgentRunner, EventStream};
use crate::context::RunContext;
use crate::error::{HostResult, RunnerError, SessionError};
use crate::session::InMemorySessionService;
use crate::runner::SessionService;
use a2a_host_core::{Content, Event, SessionKey};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

const ECHO_AUTHOR: &str = "echo_agent";

/// One step of a script.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Yield this event.
    Emit(Event),
    /// Yield a final text event repeating the user's message.
    Echo,
    /// Fail the run with this message.
    Fail(String),
    /// Wait before the next step.
    Delay(Duration),
}

/// Runner that plays back the same steps for every message.
///
/// Every yielded event is appended to the session history, as a real
/// runtime would do. The store keeps at most
/// [`MAX_SESSION_EVENTS`](crate::session::MAX_SESSION_EVENTS) of them.
pub struct ScriptedRunner {
    steps: Arc<Vec<ScriptStep>>,
    sessions: Arc<InMemorySessionService>,
    name: &'static str,
}

impl ScriptedRunner {
    pub fn new(sessions: Arc<InMemorySessionService>, steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Arc::new(steps),
            sessions,
            name: "scripted-runner",
        }
    }

    /// A runner answering every message with `Echo: <message>`.
    pub fn echo(sessions: Arc<InMemorySessionService>) -> Self {
        Self {
            name: "echo-runner",
            ..Self::new(sessions, vec![ScriptStep::Echo])
        }
    }
}

#[async_trait]
impl AgentRunner for ScriptedRunner {
    async fn run(
        &self,
        session: &SessionKey,
        new_message: Content,
        ctx: RunContext,
    ) -> HostResult<EventStream> {
        if self.sessions.get_session(session).await?.is_none() {
            return Err(RunnerError::invocation_with_source(
                format!("Session not found: {}", session.session_id),
                SessionError::NotFound {
                    key: session.clone(),
                },
            )
            .into());
        }

        let user_text: String = new_message
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        self.sessions.append_event(
            session,
            Event {
                author: Some("user".to_string()),
                content: Some(new_message),
                ..Event::default()
            },
        )?;

        tracing::debug!(
            request_id = ctx.request_id(),
            steps = self.steps.len(),
            "replaying script"
        );

        let steps = Arc::clone(&self.steps);
        let sessions = Arc::clone(&self.sessions);
        let key = session.clone();

        let events = stream::iter(0..steps.len())
            .then(move |index| {
                let step = steps[index].clone();
                let user_text = user_text.clone();
                async move {
                    match step {
                        ScriptStep::Emit(event) => Some(Ok(event)),
                        ScriptStep::Echo => {
                            Some(Ok(Event::text(ECHO_AUTHOR, format!("Echo: {user_text}"))))
                        }
                        ScriptStep::Fail(message) => Some(Err(RunnerError::stream(message).into())),
                        ScriptStep::Delay(duration) => {
                            tokio::time::sleep(duration).await;
                            None
                        }
                    }
                }
            })
            .filter_map(|item| async move { item })
            .inspect(move |item| {
                if let Ok(event) = item {
                    if let Err(err) = sessions.append_event(&key, event.clone()) {
                        tracing::warn!(session = %key, error = %err, "event not recorded");
                    }
                }
            });

        Ok(events.boxed())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
