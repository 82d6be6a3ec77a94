//! Cookie builders for the session token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const SIGN_IN_COOKIE: &str = "sign_in";

/// Session-token JWT lifetime and cookie Max-Age in seconds (30 days).
pub const SESSION_TOKEN_EXP: u64 = 30 * 24 * 60 * 60;

/// Deployment-specific cookie attributes.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    /// `Domain` attribute; host-only cookie when `None`.
    pub domain: Option<String>,
    /// `Secure` attribute. Disable only for plain-HTTP local development.
    pub secure: bool,
}

fn session_cookie(value: String, max_age: Duration, settings: &CookieSettings) -> Cookie<'static> {
    let mut builder = Cookie::build((SIGN_IN_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use cakeorder_auth_types::cookie::{CookieSettings, SIGN_IN_COOKIE, set_session_cookie};
///
/// let settings = CookieSettings { domain: Some("example.com".to_string()), secure: true };
/// let jar = set_session_cookie(CookieJar::new(), "token_value".to_string(), &settings);
/// let cookie = jar.get(SIGN_IN_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "token_value");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, settings: &CookieSettings) -> CookieJar {
    jar.add(session_cookie(
        value,
        Duration::seconds(SESSION_TOKEN_EXP as i64),
        settings,
    ))
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use cakeorder_auth_types::cookie::{
///     CookieSettings, SIGN_IN_COOKIE, clear_session_cookie, set_session_cookie,
/// };
///
/// let settings = CookieSettings::default();
/// let jar = set_session_cookie(CookieJar::new(), "t".to_string(), &settings);
/// let jar = clear_session_cookie(jar, &settings);
/// let cookie = jar.get(SIGN_IN_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.domain(), None);
/// ```
pub fn clear_session_cookie(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(session_cookie(String::new(), Duration::ZERO, settings))
}
