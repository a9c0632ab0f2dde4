pub mod authenticator;
pub mod context;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod registrar;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use authenticator::Authenticator;
pub use context::SecurityContext;
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use registrar::Registrar;
pub use token::{Claims, TokenCodec};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the account to authenticate.
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    /// User's password.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Name of the role the account should hold ("user" or "admin",
    /// case-insensitive).
    #[validate(length(min = 1))]
    pub role: String,
}

/// Response structure after a successful login: the bearer token and the
/// username it was minted for.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
}

/// Response structure after a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
    pub username: String,
    pub role: String,
}
