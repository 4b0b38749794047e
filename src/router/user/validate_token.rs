//! Report whether the presented session token is still valid.
//!
//! The session middleware already did the verification; reaching the handler
//! is the proof.

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub valid: bool,
    pub user_id: Uuid,
}

pub async fn handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<Response> {
    Json(Response {
        valid: true,
        user_id: user.id,
    })
}
