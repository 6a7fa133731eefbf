//! Session records, the in-memory session store, and startup bootstrap.
//!
//! The host serves one fixed session shared by every caller. It is created
//! once at startup by [`bootstrap_session`] and never recreated.

use crate::error::{HostResult, SessionError};
use crate::runner::SessionService;
use a2a_host_core::{Event, SessionKey};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Events kept per session; the oldest are dropped beyond this.
pub const MAX_SESSION_EVENTS: usize = 1_000;

/// A conversation held by the runtime's session store.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub key: SessionKey,
    /// Events recorded so far, oldest first.
    pub events: Vec<Event>,
}

impl Session {
    #[must_use]
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            events: Vec::new(),
        }
    }
}

/// Process-local session store.
///
/// Uses `parking_lot::RwLock`; no lock is held across an await point.
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to an existing session, evicting the oldest events
    /// once the session holds [`MAX_SESSION_EVENTS`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when the session does not exist.
    pub fn append_event(&self, key: &SessionKey, event: Event) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SessionError::NotFound { key: key.clone() })?;
        session.events.push(event);
        let excess = session.events.len().saturating_sub(MAX_SESSION_EVENTS);
        if excess > 0 {
            session.events.drain(..excess);
        }
        Ok(())
    }

    /// Number of sessions currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(&self, key: &SessionKey) -> HostResult<Session> {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(key) {
            return Err(SessionError::AlreadyExists { key: key.clone() }.into());
        }
        let session = Session::new(key.clone());
        sessions.insert(key.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, key: &SessionKey) -> HostResult<Option<Session>> {
        Ok(self.sessions.read().get(key).cloned())
    }
}

/// Create the fixed session at startup.
///
/// Failure is logged and otherwise ignored: the service still starts, and
/// requests against the missing session fail inside the runner. Returns
/// whether the session was created.
pub async fn bootstrap_session(service: &dyn SessionService, key: &SessionKey) -> bool {
    tracing::info!(session = %key, "creating runtime session");
    match service.create_session(key).await {
        Ok(session) => {
            tracing::info!(
                session = %session.key,
                events = session.events.len(),
                "runtime session created"
            );
            true
        }
        Err(err) => {
            tracing::error!(session = %key, error = %err, "failed to create runtime session");
            false
        }
    }
}
