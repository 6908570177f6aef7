//! # Commands and the Dispatcher Seam
//!
//! A [`Command`] is a request for a state change. The API layer builds one
//! per request and hands it to a [`CommandDispatcher`], which routes it to
//! whatever business logic owns that change. The dispatcher's errors are
//! returned as [`CommandError`] values.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{CommandError, ValidationError};
use crate::identity::UserId;

/// Message returned when a change-email request carries no usable email.
pub(crate) const EMAIL_NULL_MESSAGE: &str = "Email can't be null";

/// Change the email address of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEmailCommand {
    user_id: UserId,
    email: String,
}

impl ChangeEmailCommand {
    /// Build the command. The email must be non-empty; its format is the
    /// dispatcher's concern.
    pub fn new(user_id: UserId, email: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.into();
        if email.is_empty() {
            return Err(ValidationError::MissingField {
                field: "email",
                message: EMAIL_NULL_MESSAGE.to_string(),
            });
        }
        Ok(Self { user_id, email })
    }

    /// The user whose email changes.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The requested email address.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Every command the dispatcher understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Command {
    /// See [`ChangeEmailCommand`].
    ChangeEmail(ChangeEmailCommand),
}

impl Command {
    /// Stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChangeEmail(_) => "change_email",
        }
    }
}

impl From<ChangeEmailCommand> for Command {
    fn from(cmd: ChangeEmailCommand) -> Self {
        Self::ChangeEmail(cmd)
    }
}

/// Routes commands to their handlers.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// request tasks behind an `Arc`. The trait is object-safe.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Execute the command. Errors are reported, never retried here.
    async fn dispatch(&self, command: Command) -> Result<(), CommandError>;
}
