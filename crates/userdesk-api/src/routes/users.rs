//! # User Routes
//!
//! Routes:
//! - POST   /users/{uuid}/email — Change the caller's own email address
//!
//! The handler only adapts HTTP to [`ChangeEmailRequestHandler`]; the
//! authorization and command construction live in `userdesk-core`.
//!
//! The body is decoded leniently. An absent, malformed or mistyped body has
//! no email, so identifier and caller checks always come first.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use userdesk_core::{ChangeEmailBody, ChangeEmailRequestHandler};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json_or_default;
use crate::middleware::metrics::EMAIL_CHANGES_TOTAL;
use crate::state::AppState;

/// Change-email request body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChangeEmailRequest {
    /// The new email address.
    pub email: Option<String>,
}

impl From<ChangeEmailRequest> for ChangeEmailBody {
    fn from(req: ChangeEmailRequest) -> Self {
        Self { email: req.email }
    }
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{uuid}/email", post(change_email))
}

/// POST /users/{uuid}/email — Change the caller's own email.
#[utoipa::path(
    post,
    path = "/users/{uuid}/email",
    params(("uuid" = String, Path, description = "Identifier (UUID) of the user whose email changes; must be the caller")),
    request_body = ChangeEmailRequest,
    responses(
        (status = 201, description = "Email changed"),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Caller is not the target user", body = ErrorBody),
        (status = 409, description = "Conflict", body = ErrorBody),
    ),
    security(("Bearer" = [])),
    tag = "User"
)]
async fn change_email(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(uuid): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let req: ChangeEmailRequest = json_or_default(&body);

    ChangeEmailRequestHandler::new(&caller, state.dispatcher.as_ref())
        .handle(&uuid, req.into())
        .await?;

    metrics::counter!(EMAIL_CHANGES_TOTAL).increment(1);
    Ok(StatusCode::CREATED)
}
