//! # Session Authentication Middleware
//!
//! Resolves the bearer token into the session identity before any handler
//! runs.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {user_id}:{secret}   — AUTH_TOKEN configured
//! Bearer {user_id}            — AUTH_TOKEN unset (development mode)
//! ```
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl,
//! and hand it to domain code as a [`SessionProvider`].

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use userdesk_core::{SessionError, SessionProvider, UserId};

use crate::error::{AppError, ErrorBody};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The user this session is bound to.
    pub user_id: UserId,
}

impl SessionProvider for CallerIdentity {
    fn current_user(&self) -> Result<UserId, SessionError> {
        Ok(self.user_id)
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if none is present.
impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no session identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the secret.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Shared secret expected after the user id. `None` in development mode.
    pub secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of secrets. Length mismatch still performs a
/// comparison so timing does not depend on where the inputs differ.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token into the caller's identity.
///
/// With a configured secret the token must be `{user_id}:{secret}`; without
/// one it is just `{user_id}`.
pub fn parse_bearer_token(
    provided: &str,
    expected_secret: Option<&str>,
) -> Result<CallerIdentity, String> {
    let (user_part, secret_part) = match provided.split_once(':') {
        Some((user, secret)) => (user, Some(secret)),
        None => (provided, None),
    };

    match (expected_secret, secret_part) {
        (Some(expected), Some(secret)) => {
            if !constant_time_token_eq(secret, expected) {
                return Err("invalid bearer token".into());
            }
        }
        (Some(_), None) => {
            return Err("invalid token format: expected {user_id}:{secret}".into());
        }
        (None, Some(_)) => {
            return Err("invalid token format: expected {user_id}".into());
        }
        (None, None) => {}
    }

    let user_id = UserId::parse(user_part).map_err(|e| format!("invalid user_id: {e}"))?;
    Ok(CallerIdentity { user_id })
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Extract and validate the Bearer token from the Authorization header and
/// inject the resulting [`CallerIdentity`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request
        .extensions()
        .get::<AuthConfig>()
        .cloned()
        .unwrap_or_default();

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) => match header_value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, config.secret.as_deref()) {
                Ok(identity) => {
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    unauthorized_response(&msg)
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("UNAUTHORIZED", message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const ALICE: &str = "11111111-1111-1111-1111-111111111111";

    /// Minimal router echoing the resolved session user.
    fn test_app(secret: Option<&str>) -> Router {
        let auth_config = AuthConfig {
            secret: secret.map(str::to_string),
        };
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move { caller.user_id.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth_config))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn valid_token_resolves_session_user() {
        let header = format!("Bearer {ALICE}:s3cret");
        let (status, body) = call(test_app(Some("s3cret")), Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ALICE);
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let header = format!("Bearer {ALICE}:nope");
        let (status, body) = call(test_app(Some("s3cret")), Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"].as_str().unwrap().contains("invalid"));
    }

    #[tokio::test]
    async fn missing_header_rejected() {
        let (status, body) = call(test_app(Some("s3cret")), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing"));
    }

    #[tokio::test]
    async fn missing_header_rejected_in_development_mode() {
        let (status, _) = call(test_app(None), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) = call(test_app(Some("s3cret")), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn development_mode_accepts_bare_user_id() {
        let header = format!("Bearer {ALICE}");
        let (status, body) = call(test_app(None), Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ALICE);
    }

    #[tokio::test]
    async fn extractor_without_middleware_is_401() {
        let app = Router::new().route(
            "/whoami",
            get(|caller: CallerIdentity| async move { caller.user_id.to_string() }),
        );
        let (status, _) = call(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn constant_time_eq_identical() {
        assert!(constant_time_token_eq("secret-token-123", "secret-token-123"));
    }

    #[test]
    fn constant_time_eq_rejects_prefix_and_empty() {
        assert!(!constant_time_token_eq("secret", "secret-token-123"));
        assert!(!constant_time_token_eq("", "secret-token-123"));
    }

    #[test]
    fn parse_requires_secret_when_configured() {
        let err = parse_bearer_token(ALICE, Some("s3cret")).unwrap_err();
        assert!(err.contains("{user_id}:{secret}"));
    }

    #[test]
    fn parse_rejects_secret_in_development_mode() {
        let token = format!("{ALICE}:anything");
        assert!(parse_bearer_token(&token, None).is_err());
    }

    #[test]
    fn parse_rejects_bad_user_id() {
        let err = parse_bearer_token("not-a-uuid:s3cret", Some("s3cret")).unwrap_err();
        assert!(err.contains("invalid user_id"));
    }

    #[test]
    fn secret_may_contain_colons() {
        let token = format!("{ALICE}:a:b:c");
        let identity = parse_bearer_token(&token, Some("a:b:c")).unwrap();
        assert_eq!(identity.user_id.to_string(), ALICE);
    }

    #[test]
    fn caller_identity_is_a_session_provider() {
        let id = UserId::parse(ALICE).unwrap();
        let caller = CallerIdentity { user_id: id };
        assert_eq!(caller.current_user().unwrap(), id);
    }

    #[test]
    fn auth_config_debug_redacts_secret() {
        let config = AuthConfig {
            secret: Some("s3cret".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("REDACTED"));
    }
}
