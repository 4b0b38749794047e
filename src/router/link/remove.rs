//! Delete an owned link.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::Result;
use crate::link::LinkRepository;
use crate::middleware::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Response>> {
    let links = LinkRepository::new(state.db.postgres.clone());

    let link = super::find_owned(&links, id, auth.id).await?;
    links.delete(link.id).await?;

    Ok(Json(Response {
        message: "Link deleted successfully.".to_owned(),
    }))
}
