//! Request identity extractors.
//!
//! A request is made either by a signed-in user (bearer token or access-token cookie)
//! or by a guest announcing itself with `User-Type: guest`. Anything else is rejected.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use http::request::Parts;
use http::{HeaderMap, StatusCode, header};

use crate::cookie::AIRLYTICS_ACCESS_TOKEN;
use crate::token::{TokenInfo, validate_access_token};

/// Header a guest client sends instead of credentials.
pub const USER_TYPE_HEADER: &str = "user-type";

/// Gives extractors access to the JWT secret held in application state.
pub trait TokenSecret {
    fn jwt_secret(&self) -> &str;
}

/// Rejection for [`Viewer`] and [`Member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityRejection {
    #[error("authentication required")]
    Unauthorized,
    #[error("guests cannot perform this action")]
    GuestRestriction,
}

impl IdentityRejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::GuestRestriction => "GUEST_RESTRICTION",
        }
    }
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::GuestRestriction => StatusCode::FORBIDDEN,
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Whoever is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Guest,
    User(TokenInfo),
}

impl Viewer {
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    pub fn user(&self) -> Option<&TokenInfo> {
        match self {
            Self::User(info) => Some(info),
            Self::Guest => None,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim().to_owned())
        .filter(|t| !t.is_empty())
}

fn resolve_viewer(headers: &HeaderMap, secret: &str) -> Result<Viewer, IdentityRejection> {
    let token = bearer_token(headers).or_else(|| {
        CookieJar::from_headers(headers)
            .get(AIRLYTICS_ACCESS_TOKEN)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    });

    if let Some(token) = token {
        return validate_access_token(&token, secret)
            .map(Viewer::User)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected access token");
                IdentityRejection::Unauthorized
            });
    }

    let is_guest = headers
        .get(USER_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("guest"));
    if is_guest {
        Ok(Viewer::Guest)
    } else {
        Err(IdentityRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: TokenSecret + Send + Sync,
{
    type Rejection = IdentityRejection;

    // Resolve synchronously and return a 'static future so the borrowed parts and
    // state do not leak into the returned future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let viewer = resolve_viewer(&parts.headers, state.jwt_secret());
        async move { viewer }
    }
}

/// A signed-in user. Guests are rejected with 403.
#[derive(Debug, Clone)]
pub struct Member(pub TokenInfo);

impl<S> FromRequestParts<S> for Member
where
    S: TokenSecret + Send + Sync,
{
    type Rejection = IdentityRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let member = match resolve_viewer(&parts.headers, state.jwt_secret()) {
            Ok(Viewer::User(info)) => Ok(Member(info)),
            Ok(Viewer::Guest) => Err(IdentityRejection::GuestRestriction),
            Err(e) => Err(e),
        };
        async move { member }
    }
}
