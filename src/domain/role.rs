//! Membership roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Role of a user inside a course. Stored as a three-letter code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "std")]
    Student,
    #[serde(rename = "ast")]
    Assistant,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Student, Role::Assistant];

    /// Storage code
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "std",
            Role::Assistant => "ast",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Assistant => "Assistant",
        }
    }
}

impl FromStr for Role {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "std" => Ok(Role::Student),
            "ast" => Ok(Role::Assistant),
            other => Err(ServerError::Validation(format!("unknown role '{}'", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
