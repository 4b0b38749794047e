//! Finish the password-reset flow: consume the token, store the new hash.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::recovery::RecoveryRepository;
use crate::router::Valid;
use crate::user::UserRepository;

#[derive(Debug, Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct Body {
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
}

pub async fn handler(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let digest = state.crypto.hasher.digest(&reset_token);

    let user_id = RecoveryRepository::new(state.db.postgres.clone())
        .consume_reset_token(&digest)
        .await?
        .ok_or(ServerError::NotFound("reset token"))?;

    let password_hash = state
        .crypto
        .pwd
        .hash_password(&body.password)
        .map_err(|err| ServerError::internal("password hash failed", err))?;

    UserRepository::new(state.db.postgres.clone())
        .set_password(user_id, &password_hash)
        .await?;

    Ok(Json(Response {
        message: "Password updated successfully.".to_owned(),
    }))
}
