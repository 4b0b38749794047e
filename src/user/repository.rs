//! Handle database requests.

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::Result;
use crate::user::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (id, name, username, email, password)
                VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find current user using `id` field.
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&get_by_field_query(Field::Id))
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user using `email` field.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&get_by_field_query(Field::Email))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user using `username` field.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&get_by_field_query(Field::Username))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Update profile fields (name, username, bio).
    pub async fn update_profile(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"UPDATE users
                SET name = $1, username = $2, bio = $3, updated_at = NOW()
                WHERE id = $4"#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.bio)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the stored password hash.
    pub async fn set_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2"#,
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store the URL returned by the image host.
    pub async fn set_profile_image(
        &self,
        user_id: Uuid,
        image_url: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE users SET profile_image_url = $1, updated_at = NOW() WHERE id = $2"#,
        )
        .bind(image_url)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bump the owner's link counter.
    ///
    /// Runs outside the link insert's transaction; a failure here leaves the
    /// counter behind the true link count.
    pub async fn increment_link_count(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"UPDATE users SET number_of_link = number_of_link + 1 WHERE id = $1"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Field {
    Id,
    Email,
    Username,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Field::Id => write!(f, "id"),
            Field::Email => write!(f, "email"),
            Field::Username => write!(f, "username"),
        }
    }
}

fn get_by_field_query(field: Field) -> String {
    format!(
        r#"SELECT
                id,
                name,
                username,
                email,
                password,
                verified,
                bio,
                is_private,
                profile_image_url,
                number_of_link,
                stripe_customer_id,
                created_at,
                updated_at
            FROM users
            WHERE {field} = $1"#
    )
}
