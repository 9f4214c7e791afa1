use std::fmt;
use uuid::Uuid;

/// Per-observer connection identifier (random UUID, never persisted).
///
/// Keys the gateway's connection registry; two connects from the same client
/// always get two distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnId(pub String);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
