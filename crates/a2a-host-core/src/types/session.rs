use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_APP_NAME: &str = "routing_app";
pub const DEFAULT_USER_ID: &str = "default_user";
pub const DEFAULT_SESSION_ID: &str = "default_session";

/// Identifies one conversation in the runtime's session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new(DEFAULT_APP_NAME, DEFAULT_USER_ID, DEFAULT_SESSION_ID)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}
