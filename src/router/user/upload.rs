//! Avatar upload: multipart file in, image-host URL out.

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::upload::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES};
use crate::user::UserRepository;

const FIELD_NAME: &str = "image";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub message: String,
    pub profile_image_url: String,
}

fn image_error(message: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        FIELD_NAME,
        ValidationError::new("image").with_message(message.into()),
    );
    errors
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<Json<Response>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| image_error("Malformed multipart body."))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(image_error("Only image files are allowed.").into());
        }

        let data = field
            .bytes()
            .await
            .map_err(|_| image_error("Image exceeds the size limit."))?;
        if data.len() > MAX_IMAGE_BYTES {
            return Err(image_error("Image exceeds the size limit.").into());
        }

        let url = state.images.upload(&data).await?;
        UserRepository::new(state.db.postgres.clone())
            .set_profile_image(auth.id, &url)
            .await?;

        return Ok(Json(Response {
            message: "Profile image updated.".to_owned(),
            profile_image_url: url,
        }));
    }

    Err(image_error("Missing 'image' field.").into())
}
