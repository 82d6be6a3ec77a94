//! Session extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::request::Parts;
use http::{StatusCode, header};
use uuid::Uuid;

use crate::cookie::SIGN_IN_COOKIE;
use crate::token::validate_session_token;

/// HMAC secret used to validate session tokens. Provide it from the router
/// state with `impl FromRef<AppState> for SessionSecret`.
#[derive(Clone)]
pub struct SessionSecret(pub String);

/// Signed-in caller, taken from the `sign_in` cookie or an
/// `Authorization: Bearer` header. The cookie is tried first; a cookie token
/// that fails validation falls through to the bearer token.
///
/// Ownership and role checks are done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub user_role: u8,
    pub expires_at: u64,
}

/// 401 with the same JSON shape the services use for their own errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "message": "unauthorized",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Candidate tokens in the order they are tried: cookie, then bearer.
fn tokens_from_parts(parts: &Parts) -> Vec<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar
        .get(SIGN_IN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty());
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty());
    cookie.into_iter().chain(bearer).collect()
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionSecret: FromRef<S>,
{
    type Rejection = SessionRejection;

    // axum-core 0.5 defines this as `fn -> impl Future + Send`; read everything
    // from `parts` synchronously and return a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = SessionSecret::from_ref(state);
        let tokens = tokens_from_parts(parts);

        async move {
            let info = tokens
                .iter()
                .find_map(|token| validate_session_token(token, &secret.0).ok())
                .ok_or(SessionRejection)?;
            Ok(Self {
                user_id: info.user_id,
                user_role: info.user_role,
                expires_at: info.exp,
            })
        }
    }
}
