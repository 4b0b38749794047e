use axum::http::StatusCode;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::link::{Link, LinkRepository};
use crate::middleware::AuthenticatedUser;
use crate::router::Valid;
use crate::user::UserRepository;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Url is required."))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    pub link: Link,
}

/// Handler to create a link.
pub async fn handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Response>)> {
    let links = LinkRepository::new(state.db.postgres.clone());

    let link = Link::new(auth.id, body.title, body.url);
    links.insert(&link).await?;

    // Counter bump is a separate write: a failure here leaves it behind the
    // true link count.
    UserRepository::new(state.db.postgres.clone())
        .increment_link_count(auth.id)
        .await?;

    let link = links
        .find_by_id(link.id)
        .await?
        .unwrap_or(link);

    Ok((
        StatusCode::CREATED,
        Json(Response {
            message: "Link created successfully.".to_owned(),
            link,
        }),
    ))
}
