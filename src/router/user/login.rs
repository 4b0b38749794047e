use axum::http::header;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::AppState;
use crate::error::{AuthFailure, Result, ServerError};
use crate::recovery::RecoveryRepository;
use crate::router::Valid;
use crate::user::{User, UserRepository};

#[derive(Debug, Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct Body {
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    pub user: User,
}

/// Handler to login a user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<impl axum::response::IntoResponse> {
    let users = UserRepository::new(state.db.postgres.clone());

    let Some(user) = users.find_by_email(&body.email).await? else {
        return Err(ServerError::NotFound("user"));
    };

    state
        .crypto
        .pwd
        .verify_password(&body.password, &user.password)
        .map_err(|_| ServerError::Unauthorized(AuthFailure::BadCredentials))?;

    // A successful login invalidates any outstanding reset token.
    RecoveryRepository::new(state.db.postgres.clone())
        .clear_reset_tokens(user.id)
        .await?;

    let token = state
        .token
        .create(user.id)
        .map_err(|err| ServerError::internal("token creation failed", err))?;

    Ok((
        [(header::SET_COOKIE, super::session_cookie(&token))],
        Json(Response {
            message: "Login successful.".to_owned(),
            user,
        }),
    ))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    async fn register(app: axum::Router, email: &str, password: &str) {
        let req_body = json!({
            "name": "Alice",
            "email": email,
            "password": password,
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
    }

    #[sqlx::test]
    async fn test_login_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        register(app.clone(), "a@x.com", "secret1").await;

        let req_body = json!({"email": "a@x.com", "password": "secret1"});
        let response = make_request(
            app,
            Method::POST,
            "/api/v1/user/login",
            None,
            req_body.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .expect("session cookie must be set")
            .to_str()
            .unwrap()
            .to_owned();
        assert!(cookie.starts_with("token="));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.user.username, "a");
    }

    #[sqlx::test]
    async fn test_login_with_wrong_password(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        register(app.clone(), "a@x.com", "secret1").await;

        let req_body = json!({"email": "a@x.com", "password": "wrong-one"});
        let response = make_request(
            app,
            Method::POST,
            "/api/v1/user/login",
            None,
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_login_with_unknown_email(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let req_body = json!({"email": "nobody@x.com", "password": "secret1"});
        let response = make_request(
            app,
            Method::POST,
            "/api/v1/user/login",
            None,
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_login_clears_reset_tokens(pool: Pool<Postgres>) {
        let state = router::state(pool.clone());
        let app = app(state.clone());

        register(app.clone(), "a@x.com", "secret1").await;

        let users = user::UserRepository::new(pool.clone());
        let user = users.find_by_email("a@x.com").await.unwrap().unwrap();

        let recovery = recovery::RecoveryRepository::new(pool);
        recovery
            .replace_reset_token(user.id, "digest")
            .await
            .unwrap();

        let req_body = json!({"email": "a@x.com", "password": "secret1"});
        let response = make_request(
            app,
            Method::POST,
            "/api/v1/user/login",
            None,
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        // Defensive cleanup: the outstanding token died with the login.
        assert_eq!(
            recovery.consume_reset_token("digest").await.unwrap(),
            None
        );
    }
}
