//! # Change-Email Request Handler
//!
//! Turns a raw change-email request into a dispatched
//! [`ChangeEmailCommand`], enforcing that the caller only touches their
//! own record.
//!
//! ## Steps
//!
//! 1. Parse the target identifier (`InvalidIdentifier` on failure).
//! 2. Ask the session who the caller is.
//! 3. Reject a target that differs from the caller (`Forbidden`).
//! 4. Require an email in the body (`MissingField`). Format is not checked.
//! 5. Dispatch the command; dispatcher errors pass through unchanged.
//!
//! Nothing is dispatched unless steps 1–4 succeed. Repeated identical calls
//! dispatch repeated commands.

use crate::command::{ChangeEmailCommand, CommandDispatcher, EMAIL_NULL_MESSAGE};
use crate::error::{ChangeEmailError, ValidationError};
use crate::identity::UserId;
use crate::session::SessionProvider;

/// Payload of a change-email request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEmailBody {
    /// The new email address. `None` when absent or `null` in the payload.
    pub email: Option<String>,
}

/// Authorizes a change-email request and forwards it as a command.
///
/// Borrows its collaborators, so it is cheap to build per request.
pub struct ChangeEmailRequestHandler<'a> {
    session: &'a dyn SessionProvider,
    dispatcher: &'a dyn CommandDispatcher,
}

impl<'a> ChangeEmailRequestHandler<'a> {
    /// Create a handler bound to one session and a shared dispatcher.
    pub fn new(session: &'a dyn SessionProvider, dispatcher: &'a dyn CommandDispatcher) -> Self {
        Self {
            session,
            dispatcher,
        }
    }

    /// Handle one request. See the module docs for the exact sequence.
    pub async fn handle(
        &self,
        target_user_id: &str,
        body: ChangeEmailBody,
    ) -> Result<(), ChangeEmailError> {
        let target = UserId::parse(target_user_id).map_err(ChangeEmailError::InvalidIdentifier)?;

        let caller = self.session.current_user()?;
        if caller != target {
            tracing::warn!(
                caller = %caller,
                target = %target,
                "change-email denied: target is not the session user"
            );
            return Err(ChangeEmailError::Forbidden);
        }

        let email = body.email.ok_or_else(|| {
            ChangeEmailError::MissingField(ValidationError::MissingField {
                field: "email",
                message: EMAIL_NULL_MESSAGE.to_string(),
            })
        })?;
        let command =
            ChangeEmailCommand::new(target, email).map_err(ChangeEmailError::MissingField)?;

        self.dispatcher.dispatch(command.into()).await?;
        tracing::info!(user_id = %target, "change-email command accepted");
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::command::Command;
    use crate::error::{CommandError, SessionError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use uuid::Uuid;

    struct FixedSession(UserId);

    impl SessionProvider for FixedSession {
        fn current_user(&self) -> Result<UserId, SessionError> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        seen: Mutex<Vec<Command>>,
    }

    #[async_trait]
    impl CommandDispatcher for RecordingDispatcher {
        async fn dispatch(&self, command: Command) -> Result<(), CommandError> {
            self.seen.lock().push(command);
            Ok(())
        }
    }

    fn run<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    fn user_id() -> impl Strategy<Value = UserId> {
        any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
    }

    proptest! {
        /// A caller changing their own email dispatches exactly that command.
        #[test]
        fn self_change_dispatches_exactly_once(id in user_id(), email in "[a-z]{1,12}@[a-z]{1,8}\\.com") {
            let session = FixedSession(id);
            let dispatcher = RecordingDispatcher::default();
            let handler = ChangeEmailRequestHandler::new(&session, &dispatcher);

            let result = run(handler.handle(&id.to_string(), ChangeEmailBody { email: Some(email.clone()) }));
            prop_assert!(result.is_ok());

            let seen = dispatcher.seen.lock();
            prop_assert_eq!(seen.len(), 1);
            let expected = Command::ChangeEmail(ChangeEmailCommand::new(id, email).unwrap());
            prop_assert_eq!(&seen[0], &expected);
        }

        /// Any other target is forbidden and dispatches nothing.
        #[test]
        fn foreign_target_is_forbidden(caller in user_id(), target in user_id()) {
            prop_assume!(caller != target);
            let session = FixedSession(caller);
            let dispatcher = RecordingDispatcher::default();
            let handler = ChangeEmailRequestHandler::new(&session, &dispatcher);

            let result = run(handler.handle(&target.to_string(), ChangeEmailBody { email: Some("a@b.com".into()) }));
            prop_assert_eq!(result, Err(ChangeEmailError::Forbidden));
            prop_assert!(dispatcher.seen.lock().is_empty());
        }

        /// Strings that are not UUIDs never reach the dispatcher.
        #[test]
        fn non_uuid_is_invalid_identifier(raw in "[g-z ]{0,40}") {
            let session = FixedSession(UserId::new());
            let dispatcher = RecordingDispatcher::default();
            let handler = ChangeEmailRequestHandler::new(&session, &dispatcher);

            let result = run(handler.handle(&raw, ChangeEmailBody { email: Some("a@b.com".into()) }));
            prop_assert!(matches!(result, Err(ChangeEmailError::InvalidIdentifier(_))));
            prop_assert!(dispatcher.seen.lock().is_empty());
        }
    }
}
