//! The local, trusted operator profile.

use serde::{Deserialize, Serialize};

/// Name used when the profile has no display name.
const DEFAULT_FIRST_NAME: &str = "User";

/// Who is operating the desk. Never verified: whatever is loaded locally is
/// what stamps tickets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Full display name.
    #[serde(default)]
    pub name: String,
    /// Avatar image reference (URL or data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// First word of the display name, used when stamping tickets.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(DEFAULT_FIRST_NAME)
    }
}
