//! Toggle visibility of an owned link.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::link::LinkRepository;
use crate::middleware::AuthenticatedUser;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    pub visible: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let links = LinkRepository::new(state.db.postgres.clone());

    let link = super::find_owned(&links, id, auth.id).await?;
    links.set_visibility(link.id, body.visible).await?;

    Ok(Json(Response {
        message: "Visibility updated successfully.".to_owned(),
    }))
}

#[cfg(test)]
pub(super) mod tests {
    use crate::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use sqlx::{Pool, Postgres};
    use uuid::Uuid;

    const ALICE: Uuid = Uuid::from_u128(1);
    const BOB: Uuid = Uuid::from_u128(2);
    const ALICE_BLOG: &str = "10000000-0000-0000-0000-000000000001";

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/links.sql"))]
    async fn test_hide_own_link(pool: Pool<Postgres>) {
        let state = router::state(pool.clone());
        let app = app(state.clone());

        let token = state.token.create(ALICE).unwrap();
        let response = make_request(
            app,
            Method::PATCH,
            &format!("/api/v1/link/visible/{ALICE_BLOG}"),
            Some(&token),
            json!({"visible": false}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let link = link::LinkRepository::new(pool)
            .find_by_id(ALICE_BLOG.parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!link.visible);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/links.sql"))]
    async fn test_toggle_foreign_link_is_unauthorized(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let token = state.token.create(BOB).unwrap();
        let response = make_request(
            app,
            Method::PATCH,
            &format!("/api/v1/link/visible/{ALICE_BLOG}"),
            Some(&token),
            json!({"visible": false}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
