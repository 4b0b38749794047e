mod repository;

pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Link as saved on database.
///
/// `position` is a caller-assigned sort key, neither contiguous nor unique.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub visible: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Create a link owned by `user_id`, visible, at position 0.
    pub fn new(user_id: Uuid, title: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            url,
            visible: true,
            position: 0,
            ..Default::default()
        }
    }
}
