use serde::{Deserialize, Serialize};

/// Minimal user projection, as resolved from a JWT subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    key: String,
    username: String,
}

impl User {
    /// Creates a user projection from persisted data.
    #[must_use]
    pub fn new(key: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            username: username.into(),
        }
    }

    /// Returns the stable user key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the unique username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}
