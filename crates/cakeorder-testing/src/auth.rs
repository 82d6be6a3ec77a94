//! Signed-in caller helpers for router tests.
//!
//! `MockSession` signs a real session token with the test secret, so requests
//! pass through the same `Session` extractor as production traffic.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use uuid::Uuid;

use cakeorder_auth_types::cookie::SIGN_IN_COOKIE;
use cakeorder_auth_types::token::issue_session_token;
use cakeorder_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockSession {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl MockSession {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn user() -> Self {
        Self::new(Uuid::now_v7(), UserRole::User)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::now_v7(), UserRole::Admin)
    }

    /// Signed session token for this identity.
    pub fn token(&self, secret: &str) -> String {
        issue_session_token(self.user_id, self.role.as_u8(), secret)
            .expect("signing a test session token")
            .0
    }

    /// `Cookie: sign_in=<token>` as a browser would send it.
    pub fn cookie_header(&self, secret: &str) -> (HeaderName, HeaderValue) {
        let value = format!("{SIGN_IN_COOKIE}={}", self.token(secret));
        (
            header::COOKIE,
            HeaderValue::from_str(&value).expect("valid cookie header"),
        )
    }

    /// `Authorization: Bearer <token>` for API clients.
    pub fn bearer_headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token(secret)))
                .expect("valid authorization header"),
        );
        map
    }
}
