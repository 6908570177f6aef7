#![deny(missing_docs)]

//! # userdesk-core — Domain Types for Userdesk
//!
//! Everything the change-email endpoint needs that is not HTTP: the
//! [`UserId`] newtype, the [`Command`] set and its [`CommandDispatcher`]
//! seam, the [`SessionProvider`] seam, and the
//! [`ChangeEmailRequestHandler`] that ties them together.
//!
//! ## Design Principles
//!
//! 1. **Collaborators are traits.** The session and the command bus are
//!    injected, never looked up globally. Tests substitute fakes.
//!
//! 2. **Errors are values.** Every failure is a `thiserror` enum variant.
//!    Dispatcher errors ([`CommandError`]) pass through the handler
//!    untouched so the HTTP layer can classify them.
//!
//! 3. **Self-only mutation.** A caller may only change the email of the
//!    user their session is bound to.
//!
//! The [`directory`] module provides an in-memory dispatcher used by the
//! development binary and by tests.

pub mod command;
pub mod directory;
pub mod error;
pub mod handler;
pub mod identity;
pub mod session;

pub use command::{ChangeEmailCommand, Command, CommandDispatcher};
pub use directory::{InMemoryUserDirectory, UserRecord};
pub use error::{ChangeEmailError, CommandError, SessionError, ValidationError};
pub use handler::{ChangeEmailBody, ChangeEmailRequestHandler};
pub use identity::UserId;
pub use session::SessionProvider;
