//! User profiles and the authorization context derived from them
//!
//! Role checks go through [`AuthContext`] instead of comparing role strings at
//! each call site. The context is resolved once per request or CLI command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Profile entry (the id comes from the external auth service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

/// Which records a fetch may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only records created by this user
    Own(String),
    /// Every record (admin)
    All,
}

impl Scope {
    /// The user id to filter on, if any
    pub fn user_filter(&self) -> Option<&str> {
        match self {
            Scope::Own(user_id) => Some(user_id),
            Scope::All => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Admin role required to {0}")]
    AdminRequired(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Session-scoped capabilities of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

impl AuthContext {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.id.clone(),
            role: profile.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins see everything, users see their own records
    pub fn scope(&self) -> Scope {
        if self.is_admin() {
            Scope::All
        } else {
            Scope::Own(self.user_id.clone())
        }
    }

    pub fn require_admin(&self, action: &str) -> Result<(), AccessError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AccessError::AdminRequired(action.to_string()))
        }
    }
}
