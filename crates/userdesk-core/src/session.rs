//! # Session Identity
//!
//! The handler never looks the caller up itself. Whoever authenticated the
//! request supplies a [`SessionProvider`] that names the bound user.

use crate::error::SessionError;
use crate::identity::UserId;

/// Source of the currently authenticated user.
pub trait SessionProvider: Send + Sync {
    /// The user the current session is bound to.
    fn current_user(&self) -> Result<UserId, SessionError>;
}
