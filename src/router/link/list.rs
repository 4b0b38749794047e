//! Own links, ascending by position.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::link::{Link, LinkRepository};
use crate::middleware::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub links: Vec<Link>,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Response>> {
    let links = LinkRepository::new(state.db.postgres.clone())
        .list_ordered(auth.id)
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
    use uuid::Uuid;

    const ALICE: Uuid = Uuid::from_u128(1);

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/links.sql"))]
    async fn test_list_is_sorted_by_position(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let token = state.token.create(ALICE).unwrap();
        let response = make_request(
            app,
            Method::GET,
            "/api/v1/link/all",
            Some(&token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();

        // Fixture rows are inserted out of order; response is not.
        assert_eq!(body.links.len(), 3);
        assert!(
            body.links.windows(2).all(|w| w[0].position <= w[1].position),
            "links must be in non-decreasing position order"
        );

        // Only the caller's links, including invisible ones.
        assert!(body.links.iter().all(|link| link.user_id == ALICE));
        assert!(body.links.iter().any(|link| !link.visible));
    }

    #[sqlx::test]
    async fn test_list_requires_session(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/api/v1/link/all",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
