mod builder;
mod repository;

pub use builder::*;
pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Derived from the email local part, re-derived whenever the email
    /// changes. Public handle under which links are exposed.
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub verified: bool,
    pub bio: Option<String>,
    pub is_private: bool,
    pub profile_image_url: Option<String>,
    pub number_of_link: i32,
    #[serde(skip)]
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lower-cased local part of an email address.
pub fn derive_username(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_username() {
        assert_eq!(derive_username("a@x.com"), "a");
        assert_eq!(derive_username("John.Doe@example.org"), "john.doe");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let user = User {
            password: "$argon2id$secret".into(),
            ..Default::default()
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }
}
