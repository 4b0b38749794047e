//! Bulk reposition links.
//!
//! Every item is an independent write; the batch is dispatched concurrently
//! and awaited together. A failing item does not roll back the others.

use axum::{Json, extract::State};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::link::LinkRepository;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub position: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    pub links: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let links = LinkRepository::new(state.db.postgres.clone());

    let updates = body
        .links
        .iter()
        .map(|item| links.set_position(item.id, item.position));

    // Await the whole batch before reporting anything; completed writes stay
    // even when a later one fails.
    for result in join_all(updates).await {
        result?;
    }

    Ok(Json(Response {
        message: "Positions updated successfully.".to_owned(),
    }))
}
