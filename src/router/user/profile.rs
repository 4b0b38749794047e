//! Read and update own profile.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::middleware::AuthenticatedUser;
use crate::router::Valid;
use crate::user::{User, UserRepository};

/// `GET /user/profile`, non-secret fields only (`password` is skipped at the
/// serialization boundary).
pub async fn get_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.db.postgres.clone())
        .find_by_id(auth.id)
        .await?;

    Ok(Json(user))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Name must be between 3 and 50 characters."
    ))]
    name: Option<String>,
    #[validate(
        length(min = 1, max = 50, message = "Username must be 1 to 50 characters."),
        custom(
            function = "crate::router::validate_username",
            message = "Username must be lowercase alphanumeric."
        )
    )]
    username: Option<String>,
    #[validate(length(max = 255, message = "Bio must be at most 255 characters."))]
    bio: Option<String>,
}

/// `PATCH /user/profile`, partial update.
pub async fn patch_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>> {
    let users = UserRepository::new(state.db.postgres.clone());
    let mut user = users.find_by_id(auth.id).await?;

    if let Some(username) = body.username {
        // Reject a handle already owned by somebody else.
        if let Some(other) = users.find_by_username(&username).await? {
            if other.id != user.id {
                return Err(ServerError::Conflict("username"));
            }
        }
        user.username = username;
    }

    if let Some(name) = body.name {
        user.name = name.trim().to_string();
    }

    if let Some(bio) = body.bio {
        user.bio = (!bio.is_empty()).then_some(bio);
    }

    users.update_profile(&user).await?;
    let user = users.find_by_id(user.id).await?;

    Ok(Json(user))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    async fn register(
        app: axum::Router,
        state: &AppState,
        email: &str,
    ) -> (uuid::Uuid, String) {
        let req_body = json!({
            "name": "Alice",
            "email": email,
            "password": "secret1",
        });
        let response = make_request(
            app,
            Method::POST,
            "/api/v1/user/register",
            None,
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: super::super::register::Response =
            serde_json::from_slice(&body).unwrap();
        let token = state.token.create(body.user.id).unwrap();
        (body.user.id, token)
    }

    #[sqlx::test]
    async fn test_get_profile(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let (_, token) = register(app.clone(), &state, "a@x.com").await;

        let response = make_request(
            app,
            Method::GET,
            "/api/v1/user/profile",
            Some(&token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(raw["username"], "a");
        // Secrets never leave the server.
        assert!(raw.get("password").is_none());
    }

    #[sqlx::test]
    async fn test_patch_profile(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let (_, token) = register(app.clone(), &state, "a@x.com").await;

        let req_body = json!({"name": "Alice B", "bio": "hello", "username": "alice-b"});
        let response = make_request(
            app,
            Method::PATCH,
            "/api/v1/user/profile",
            Some(&token),
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let user: User = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.name, "Alice B");
        assert_eq!(user.bio.as_deref(), Some("hello"));
        assert_eq!(user.username, "alice-b");
    }

    #[sqlx::test]
    async fn test_patch_username_conflict(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        // "b@x.com" owns the handle "b".
        register(app.clone(), &state, "b@x.com").await;
        let (_, token) = register(app.clone(), &state, "a@x.com").await;

        let req_body = json!({"username": "b"});
        let response = make_request(
            app,
            Method::PATCH,
            "/api/v1/user/profile",
            Some(&token),
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_patch_own_username_is_not_a_conflict(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let (_, token) = register(app.clone(), &state, "a@x.com").await;

        // Re-asserting the handle you already own is a no-op, not an error.
        let req_body = json!({"username": "a"});
        let response = make_request(
            app,
            Method::PATCH,
            "/api/v1/user/profile",
            Some(&token),
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
