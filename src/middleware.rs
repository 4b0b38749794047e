//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use cookie::Cookie;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AuthFailure, Result, ServerError};
use crate::token::TokenError;

const BEARER: &str = "Bearer ";

/// Name of the session cookie set on register and login.
pub const SESSION_COOKIE: &str = "token";

/// Identity attached to the request by [`session_auth`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    Cookie::split_parse(raw.to_owned())
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
}

fn token_from_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix(BEARER))
        .map(str::to_owned)
}

/// Session gate for protected routes.
///
/// The token is read from the session cookie first, falling back to the
/// `Authorization: Bearer` header. Verification is a pure check, no state.
pub async fn session_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = token_from_cookie(req.headers())
        .or_else(|| token_from_bearer(req.headers()));

    let Some(token) = token else {
        return Err(ServerError::Unauthorized(AuthFailure::MissingToken));
    };

    let claims = state.token.decode(&token).map_err(|err| {
        let reason = match err {
            TokenError::Expired => AuthFailure::ExpiredSession,
            TokenError::Invalid => AuthFailure::InvalidToken,
        };
        ServerError::Unauthorized(reason)
    })?;

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ServerError::Unauthorized(AuthFailure::InvalidToken))?;

    req.extensions_mut().insert(AuthenticatedUser { id });
    Ok(next.run(req).await)
}
