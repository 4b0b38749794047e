//! Account-related HTTP API.

pub mod forgot_password;
pub mod login;
pub mod profile;
pub mod register;
pub mod reset_password;
pub mod upload;
pub mod validate_token;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::AppState;
use crate::middleware::{SESSION_COOKIE, session_auth};
use crate::token::EXPIRATION_TIME;
use crate::upload::MAX_IMAGE_BYTES;

// Multipart framing overhead on top of the image itself.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 8 * 1024;

/// Session cookie carrying the freshly issued token.
pub(crate) fn session_cookie(token: &str) -> String {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(EXPIRATION_TIME as i64))
        .build()
        .to_string()
}

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // `POST /user/validateToken` checks the session.
        .route("/validateToken", post(validate_token::handler))
        // `GET|PATCH /user/profile` read and update own profile.
        .route(
            "/profile",
            get(profile::get_handler).patch(profile::patch_handler),
        )
        // `POST /user/profile/upload` stores an avatar on the image host.
        .route(
            "/profile/upload",
            post(upload::handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(state, session_auth));

    Router::new()
        .route("/register", post(register::handler))
        .route("/login", post(login::handler))
        .route("/forgotPassword", post(forgot_password::handler))
        .route("/resetPassword/{reset_token}", post(reset_password::handler))
        .merge(protected)
}
