use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of an open signaling session. Empty means "not connected".
#[derive(Debug, Serialize, Deserialize, Clone, Default, Hash, Eq, PartialEq)]
pub struct SessionId(String);

impl SessionId {
    /// Mints a local id for handshakes where the remote never issues one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
