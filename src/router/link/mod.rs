//! Link-related HTTP API.

pub mod create;
pub mod list;
pub mod positions;
pub mod public;
pub mod remove;
pub mod update;
pub mod visibility;

use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};
use uuid::Uuid;

use crate::AppState;
use crate::error::{AuthFailure, Result, ServerError};
use crate::link::{Link, LinkRepository};
use crate::middleware::session_auth;

/// Load a link and check the caller owns it: a missing link is a 404, an
/// existing link owned by somebody else is a 401.
pub(crate) async fn find_owned(
    repo: &LinkRepository,
    link_id: Uuid,
    caller: Uuid,
) -> Result<Link> {
    let Some(link) = repo.find_by_id(link_id).await? else {
        return Err(ServerError::NotFound("link"));
    };

    if link.user_id != caller {
        return Err(ServerError::Unauthorized(AuthFailure::NotOwner));
    }

    Ok(link)
}

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // `POST /link/create` goes to `create`.
        .route("/create", post(create::handler))
        // `GET /link/all` lists own links sorted by position.
        .route("/all", get(list::handler))
        // `DELETE /link/delete/:ID` removes an owned link.
        .route("/delete/{id}", delete(remove::handler))
        // `PATCH /link/update/:ID` edits an owned link.
        .route("/update/{id}", patch(update::handler))
        // `PATCH /link/visible/:ID` toggles visibility.
        .route("/visible/{id}", patch(visibility::handler))
        .route_layer(middleware::from_fn_with_state(state, session_auth));

    Router::new()
        // TODO: gate repositioning behind the session and check ownership.
        .route("/positions", put(positions::handler))
        // `GET /link/user/:USERNAME` is the public page feed.
        .route("/user/{username}", get(public::handler))
        .merge(protected)
}
