use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The closed set of roles an account can hold.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "role_name", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Resolves a role from its external name, case-insensitively.
    /// Returns `None` when the name matches no known role.
    pub fn from_value(value: &str) -> Option<Role> {
        match value.to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// The external name of the role, as accepted by `from_value`.
    pub fn as_value(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// The authority string granted to identities holding this role.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

/// A configured role record in the store. Registration requires the resolved
/// role enum to have one of these behind it.
#[derive(Debug, Clone, FromRow)]
pub struct RoleRecord {
    pub id: i64,
    pub name: Role,
}

/// A credential record: who can authenticate, with what hash, as which role.
/// Created by the registrar and never mutated afterwards.
#[derive(Debug, Clone, FromRow)]
pub struct AppUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Input for persisting a new credential record. The password is already
/// hashed by the time this struct exists.
#[derive(Debug, Clone)]
pub struct NewAppUser {
    pub username: String,
    pub password_hash: String,
    pub role_id: i64,
}

/// The authenticated identity attached to a request after the gate (or the
/// authenticator) has accepted its credentials. Valid only for the lifetime
/// of that request's processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn authority(&self) -> &'static str {
        self.role.authority()
    }
}

/// A task-owning user. Separate from `AppUser`: these are the people tasks
/// are assigned to, not the accounts that call the API.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}
