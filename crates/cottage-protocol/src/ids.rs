//! Session identifier.
//!
//! Opaque String wrapper (serde-transparent). Fresh ids are UUID v4 so they
//! are unguessable on their own; the web layer additionally signs them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create from any string value.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Create a new random id.
    pub fn new_uuid() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is safe to embed in a cookie or a file name.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= 64
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new_uuid()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_and_well_formed() {
        let a = SessionId::new_uuid();
        let b = SessionId::new_uuid();
        assert_ne!(a, b);
        assert!(a.is_well_formed());
    }

    #[test]
    fn path_like_ids_are_rejected() {
        assert!(!SessionId::from_string("../etc/passwd").is_well_formed());
        assert!(!SessionId::from_string("").is_well_formed());
        assert!(!SessionId::from_string("a;b").is_well_formed());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = SessionId::from_string("abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    }
}
