//! # Error Hierarchy
//!
//! Structured error types built with `thiserror`. No `Box<dyn Error>`,
//! no `.unwrap()` outside tests.
//!
//! - [`ValidationError`]: malformed input to a domain constructor.
//! - [`SessionError`]: the session provider could not name a caller.
//! - [`CommandError`]: failures reported by a [`CommandDispatcher`](crate::CommandDispatcher).
//!   These are opaque to the request handler and forwarded unchanged.
//! - [`ChangeEmailError`]: everything the change-email handler can return.

use thiserror::Error;

/// Validation errors for domain constructors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a valid UUID.
    #[error("invalid user identifier: \"{0}\" (expected a UUID)")]
    InvalidUserId(String),

    /// A required field was absent, null, or empty.
    #[error("{message}")]
    MissingField {
        /// Name of the field in the request payload.
        field: &'static str,
        /// Message surfaced to the client.
        message: String,
    },
}

/// The session provider has no authenticated user to report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no authenticated session: {0}")]
pub struct SessionError(pub String);

/// Errors raised by a command dispatcher.
///
/// Each variant names a classification the HTTP layer maps to a status
/// code. The request handler never inspects or rewrites them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command was rejected by a business rule (e.g. malformed email).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The command conflicts with current state (e.g. email already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The command targets a record that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The dispatcher could not reach its backend or timed out.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Unexpected infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by [`ChangeEmailRequestHandler::handle`](crate::ChangeEmailRequestHandler::handle).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangeEmailError {
    /// The target user identifier in the path is not a UUID.
    #[error("{0}")]
    InvalidIdentifier(ValidationError),

    /// The caller tried to change another user's email.
    #[error("users may only change their own email")]
    Forbidden,

    /// The request body carries no usable `email`.
    #[error("{0}")]
    MissingField(ValidationError),

    /// The session provider could not identify the caller.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The dispatcher rejected or failed the command.
    #[error(transparent)]
    Dispatch(#[from] CommandError),
}
