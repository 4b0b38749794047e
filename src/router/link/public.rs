//! Public link feed of a profile page.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::link::{Link, LinkRepository};
use crate::user::UserRepository;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub links: Vec<Link>,
}

/// Resolve a username to its links.
///
/// Visibility is not filtered here; hidden links are returned too and the
/// front-end decides what to show.
pub async fn handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Response>> {
    let Some(user) = UserRepository::new(state.db.postgres.clone())
        .find_by_username(&username)
        .await?
    else {
        return Err(ServerError::NotFound("user"));
    };

    let links = LinkRepository::new(state.db.postgres.clone())
        .list_all(user.id)
        .await?;

    Ok(Json(Response { links }))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/links.sql"))]
    async fn test_public_feed_includes_hidden_links(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/api/v1/link/user/alice",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.links.len(), 3);
        // Hidden links come back too; the visibility flag is not a filter
        // on this endpoint.
        assert!(body.links.iter().any(|link| !link.visible));
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_unknown_username(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/api/v1/link/user/nobody",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
