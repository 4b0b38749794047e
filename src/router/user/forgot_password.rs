//! Start the password-reset flow.
//!
//! Only a SHA-256 digest of the issued token touches the database; the
//! plaintext leaves the process exactly once, inside the mail event.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::mail::{Event, Template};
use crate::recovery::RecoveryRepository;
use crate::router::Valid;
use crate::user::UserRepository;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let users = UserRepository::new(state.db.postgres.clone());

    let Some(user) = users.find_by_email(&body.email).await? else {
        return Err(ServerError::NotFound("user"));
    };

    let plain = state.crypto.generate_reset_token(user.id);
    let digest = state.crypto.hasher.digest(&plain);

    RecoveryRepository::new(state.db.postgres.clone())
        .replace_reset_token(user.id, &digest)
        .await?;

    let link = format!(
        "{}/resetPassword/{}",
        state.config.url.trim_end_matches('/'),
        plain
    );

    state
        .mail
        .publish_event(Event {
            template: Template::ResetPassword,
            to: &user.email,
            username: &user.username,
            code: None,
            link: Some(&link),
        })
        .await?;

    Ok(Json(Response {
        message: "Password reset link sent.".to_owned(),
    }))
}
