use axum::http::{StatusCode, header};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::AppState;
use crate::crypto::generate_numeric_code;
use crate::error::Result;
use crate::mail::{Event, Template};
use crate::recovery::RecoveryRepository;
use crate::router::Valid;
use crate::user::{User, UserBuilder, UserRepository};

const VERIFICATION_CODE_LENGTH: usize = 5;

#[derive(Debug, Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct Body {
    #[validate(length(
        min = 3,
        max = 25,
        message = "Name must be between 3 and 25 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = 5,
        max = 255,
        message = "Password must contain at least 5 characters."
    ))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    pub user: User,
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<impl axum::response::IntoResponse> {
    let users = UserRepository::new(state.db.postgres.clone());

    if users.find_by_email(&body.email).await?.is_some() {
        return Err(crate::error::ServerError::Conflict("email"));
    }

    let user = UserBuilder::new()
        .name(&body.name)
        .email(&body.email)
        .password(&body.password)
        .build(&state.crypto)
        .map_err(|err| {
            crate::error::ServerError::internal("password hash failed", err)
        })?;

    users.insert(&user).await?;
    let user = users.find_by_id(user.id).await?;

    // Email verification stays advisory, account creation already happened.
    let code = generate_numeric_code(VERIFICATION_CODE_LENGTH);
    let recovery = RecoveryRepository::new(state.db.postgres.clone());
    recovery.replace_verification_code(user.id, &code).await?;

    if let Err(err) = state
        .mail
        .publish_event(Event {
            template: Template::VerifyEmail,
            to: &user.email,
            username: &user.username,
            code: Some(&code),
            link: None,
        })
        .await
    {
        tracing::error!(user_id = %user.id, error = %err, "verification mail not sent");
    }

    let token = state.token.create(user.id).map_err(|err| {
        crate::error::ServerError::internal("token creation failed", err)
    })?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, super::session_cookie(&token))],
        Json(Response {
            message:
                "Registration successful. Please activate your email to proceed."
                    .to_owned(),
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

    #[sqlx::test]
    async fn test_register_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let req_body = json!({
            "name": "Alice",
            "email": "a@x.com",
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

        let cookie = response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .expect("session cookie must be set")
            .to_str()
            .unwrap()
            .to_owned();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.user.name, "Alice");
        assert_eq!(body.user.username, "a");
        assert_eq!(body.user.email, "a@x.com");
        assert!(!body.user.verified);
        assert_eq!(body.user.number_of_link, 0);

        // The stored password is a hash, never the plaintext.
        assert!(body.user.password.is_empty());

        // The issued cookie decodes back to the created user.
        let token = cookie
            .trim_start_matches("token=")
            .split(';')
            .next()
            .unwrap();
        let claims = state.token.decode(token).unwrap();
        assert_eq!(claims.sub, body.user.id.to_string());
    }

    #[sqlx::test]
    async fn test_register_twice_with_same_email(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let req_body = json!({
            "name": "Alice",
            "email": "a@x.com",
            "password": "secret1",
        });
        let response = make_request(
            app.clone(),
            Method::POST,
            "/api/v1/user/register",
            None,
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        // Second attempt with the same email is always a conflict.
        let response = make_request(
            app,
            Method::POST,
            "/api/v1/user/register",
            None,
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_register_with_invalid_fields(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        for req_body in [
            // Name too short.
            json!({"name": "Al", "email": "a@x.com", "password": "secret1"}),
            // Malformed email.
            json!({"name": "Alice", "email": "not-an-email", "password": "secret1"}),
            // Password below 5 characters.
            json!({"name": "Alice", "email": "a@x.com", "password": "four"}),
        ] {
            let response = make_request(
                app.clone(),
                Method::POST,
                "/api/v1/user/register",
                None,
                req_body.to_string(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
