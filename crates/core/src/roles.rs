//! Roles and the authenticated user.
//!
//! Role strings must match the `role` claim issued by the identity provider.
//! The engine never creates or mutates users; it receives them per request.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_EMPLOYEE: &str = "employee";
pub const ROLE_QA: &str = "qa";

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &[ROLE_MANAGER, ROLE_EMPLOYEE, ROLE_QA];

/// The closed set of roles a user can hold. Exactly one per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Employee,
    #[serde(rename = "qa")]
    Qa,
}

impl Role {
    /// Parse a role claim. Unknown roles are a validation error.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_MANAGER => Ok(Self::Manager),
            ROLE_EMPLOYEE => Ok(Self::Employee),
            ROLE_QA => Ok(Self::Qa),
            _ => Err(CoreError::Validation(format!(
                "Unknown role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => ROLE_MANAGER,
            Self::Employee => ROLE_EMPLOYEE,
            Self::Qa => ROLE_QA,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated user as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn new(
        id: DbId,
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: email.into(),
            role,
        }
    }
}
