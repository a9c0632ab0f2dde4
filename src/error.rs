//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! various error conditions that can occur, from database issues to authentication
//! failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly convert
//! application errors into appropriate HTTP responses with JSON bodies.
//! It also provides `From` trait implementations for common error types like `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError`,
//! allowing for easy conversion using the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Bad username/password pair at login (HTTP 401).
    /// An unknown username and a wrong password both map here, so callers
    /// cannot tell which of the two failed.
    InvalidCredentials,
    /// Wraps any unexpected failure inside the authentication pipeline
    /// (HTTP 401), preserving the underlying message.
    AuthError(String),
    /// A protected resource was reached without an attached identity
    /// (HTTP 401). Carries the request path for the response body.
    AuthenticationRequired(String),
    /// A token that is not structurally a valid signed token (HTTP 401).
    MalformedToken(String),
    /// A token whose signature does not verify against the configured
    /// secret (HTTP 401).
    BadSignature(String),
    /// Registration with a username that already exists (HTTP 400).
    DuplicateUsername(String),
    /// Registration with a role name that maps to no known role (HTTP 400).
    UnknownRole(String),
    /// Registration with a known role that has no backing record in the
    /// store (HTTP 404). Distinct from `UnknownRole`: this is a
    /// configuration inconsistency, not a caller mistake.
    RoleNotConfigured(String),
    /// Represents an unauthorized access attempt (HTTP 401).
    Unauthorized(String),
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// Wraps errors from the `sqlx` crate.
    DatabaseError(String),
    /// Represents an error due to failed input validation (HTTP 400).
    /// Wraps errors from the `validator` crate.
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidCredentials => write!(
                f,
                "Invalid credentials. Please verify your username and password."
            ),
            AppError::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            AppError::AuthenticationRequired(path) => {
                write!(f, "Authentication required for {}", path)
            }
            AppError::MalformedToken(msg) => write!(f, "Malformed token: {}", msg),
            AppError::BadSignature(msg) => write!(f, "Bad token signature: {}", msg),
            AppError::DuplicateUsername(_) => write!(f, "The username already exists"),
            AppError::UnknownRole(role) => write!(f, "Invalid role: {}", role),
            AppError::RoleNotConfigured(_) => write!(f, "Role not found"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This implementation allows Actix Web to automatically translate `AppError`
/// results from handlers into the correct HTTP status codes and JSON error responses.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InvalidCredentials => HttpResponse::Unauthorized().json(json!({
                "error": "Unauthorized",
                "message": self.to_string()
            })),
            AppError::AuthError(msg) => HttpResponse::Unauthorized().json(json!({
                "error": "Unauthorized",
                "message": msg
            })),
            AppError::AuthenticationRequired(path) => HttpResponse::Unauthorized().json(json!({
                "error": "Unauthorized",
                "message": "You must provide a valid token to access this resource",
                "path": path
            })),
            AppError::MalformedToken(msg) | AppError::BadSignature(msg) => {
                HttpResponse::Unauthorized().json(json!({
                    "error": "Unauthorized",
                    "message": msg
                }))
            }
            AppError::DuplicateUsername(_) | AppError::UnknownRole(_) => {
                HttpResponse::BadRequest().json(json!({
                    "error": "Invalid petition",
                    "message": self.to_string()
                }))
            }
            AppError::RoleNotConfigured(_) => HttpResponse::NotFound().json(json!({
                "error": "Resource not found",
                "message": self.to_string()
            })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            // Database errors are also presented as generic internal server errors to the client.
            AppError::DatabaseError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            AppError::ValidationError(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Specific cases like `sqlx::Error::RowNotFound` are mapped to `AppError::NotFound`,
/// while other database errors become `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// Field errors are flattened into a single `field: message; ...` string.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        let details = error
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::ValidationError(details)
    }
}

/// Converts `jsonwebtoken::errors::Error` into the token failure taxonomy.
///
/// A signature mismatch becomes `BadSignature`; every other decoding failure
/// (bad structure, bad base64, bad claims JSON) becomes `MalformedToken`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        use jsonwebtoken::errors::ErrorKind;
        match error.kind() {
            ErrorKind::InvalidSignature => AppError::BadSignature(error.to_string()),
            _ => AppError::MalformedToken(error.to_string()),
        }
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
///
/// This handles errors during password hashing or verification.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
