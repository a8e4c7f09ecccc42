//! Cookie builders for the access token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::ACCESS_TOKEN_EXP;

/// Cookie name for the access token.
pub const AIRLYTICS_ACCESS_TOKEN: &str = "airlytics_access_token";

/// Set the access-token cookie on the jar. Max-Age matches the token lifetime.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use airlytics_auth_types::cookie::{set_access_token_cookie, AIRLYTICS_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(AIRLYTICS_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((AIRLYTICS_ACCESS_TOKEN, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(ACCESS_TOKEN_EXP as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the access-token cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use airlytics_auth_types::cookie::{
///     clear_access_token_cookie, set_access_token_cookie, AIRLYTICS_ACCESS_TOKEN,
/// };
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "a".to_string(), "example.com".to_string());
/// let jar = clear_access_token_cookie(jar, "example.com".to_string());
/// let access = jar.get(AIRLYTICS_ACCESS_TOKEN).unwrap();
/// assert_eq!(access.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_access_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((AIRLYTICS_ACCESS_TOKEN, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
