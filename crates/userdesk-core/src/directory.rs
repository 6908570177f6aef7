//! # In-Memory User Directory
//!
//! A [`CommandDispatcher`] that keeps user emails in process memory. The
//! development binary runs against it, and tests use it to exercise the
//! downstream error classifications (validation, not found, conflict).
//!
//! The lock is `parking_lot::RwLock` and is never held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::command::{ChangeEmailCommand, Command, CommandDispatcher};
use crate::error::CommandError;
use crate::identity::UserId;

/// A user as stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// The user's identifier.
    pub id: UserId,
    /// Current email address.
    pub email: String,
    /// When the email was last set.
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe, cloneable in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Fails with `Conflict` if the id or the email is taken.
    pub fn register(&self, id: UserId, email: &str) -> Result<UserRecord, CommandError> {
        validate_email(email)?;
        let mut users = self.users.write();
        if users.contains_key(&id) {
            return Err(CommandError::Conflict(format!("user {id} already exists")));
        }
        if email_taken(&users, email, None) {
            return Err(CommandError::Conflict(format!(
                "email {email} is already registered"
            )));
        }
        let record = UserRecord {
            id,
            email: email.to_string(),
            updated_at: Utc::now(),
        };
        users.insert(id, record.clone());
        Ok(record)
    }

    /// Look up a user.
    pub fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.users.read().get(id).cloned()
    }

    /// Current email of a user, if the user exists.
    pub fn email_of(&self, id: &UserId) -> Option<String> {
        self.users.read().get(id).map(|u| u.email.clone())
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn change_email(&self, cmd: &ChangeEmailCommand) -> Result<(), CommandError> {
        validate_email(cmd.email())?;
        let id = cmd.user_id();

        // Single write lock: the uniqueness check and the update cannot interleave
        // with another change.
        let mut users = self.users.write();
        if !users.contains_key(&id) {
            return Err(CommandError::NotFound(format!("user {id} not found")));
        }
        if email_taken(&users, cmd.email(), Some(id)) {
            return Err(CommandError::Conflict(format!(
                "email {} is already registered",
                cmd.email()
            )));
        }
        if let Some(user) = users.get_mut(&id) {
            user.email = cmd.email().to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl CommandDispatcher for InMemoryUserDirectory {
    async fn dispatch(&self, command: Command) -> Result<(), CommandError> {
        let result = match &command {
            Command::ChangeEmail(cmd) => self.change_email(cmd),
        };
        if let Err(ref e) = result {
            tracing::debug!(command = command.name(), error = %e, "command rejected");
        }
        result
    }
}

/// Email held by any user other than `except`, compared case-insensitively.
fn email_taken(users: &HashMap<UserId, UserRecord>, email: &str, except: Option<UserId>) -> bool {
    users
        .values()
        .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no whitespace.
fn validate_email(email: &str) -> Result<(), CommandError> {
    let invalid = || CommandError::Validation(format!("\"{email}\" is not a valid email address"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}
