//! Handle database requests.

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::Result;
use crate::link::Link;

const LINK_COLUMNS: &str = r#"id, user_id, title, url, visible, "position", created_at, updated_at"#;

#[derive(Clone)]
pub struct LinkRepository {
    pool: Pool<Postgres>,
}

impl LinkRepository {
    /// Create a new [`LinkRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert [`Link`] into database.
    pub async fn insert(&self, link: &Link) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO links (id, user_id, title, url, visible, "position")
                VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(link.id)
        .bind(link.user_id)
        .bind(&link.title)
        .bind(&link.url)
        .bind(link.visible)
        .bind(link.position)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find a link using `id` field.
    pub async fn find_by_id(&self, link_id: Uuid) -> Result<Option<Link>> {
        let query =
            format!(r#"SELECT {LINK_COLUMNS} FROM links WHERE id = $1"#);
        let link = sqlx::query_as::<_, Link>(&query)
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(link)
    }

    /// All links of a user, ascending by position.
    pub async fn list_ordered(&self, user_id: Uuid) -> Result<Vec<Link>> {
        let query = format!(
            r#"SELECT {LINK_COLUMNS} FROM links WHERE user_id = $1 ORDER BY "position" ASC"#
        );
        let links = sqlx::query_as::<_, Link>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(links)
    }

    /// All links of a user, hidden ones included, in storage order.
    pub async fn list_all(&self, user_id: Uuid) -> Result<Vec<Link>> {
        let query =
            format!(r#"SELECT {LINK_COLUMNS} FROM links WHERE user_id = $1"#);
        let links = sqlx::query_as::<_, Link>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(links)
    }

    /// Partial update of `title` and `url`.
    pub async fn update_content(
        &self,
        link_id: Uuid,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE links
                SET title = COALESCE($1, title),
                    url = COALESCE($2, url),
                    updated_at = NOW()
                WHERE id = $3"#,
        )
        .bind(title)
        .bind(url)
        .bind(link_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Toggle link visibility.
    pub async fn set_visibility(
        &self,
        link_id: Uuid,
        visible: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE links SET visible = $1, updated_at = NOW() WHERE id = $2"#,
        )
        .bind(visible)
        .bind(link_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Move a link to a new position.
    pub async fn set_position(
        &self,
        link_id: Uuid,
        position: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE links SET "position" = $1, updated_at = NOW() WHERE id = $2"#,
        )
        .bind(position)
        .bind(link_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete current link.
    pub async fn delete(&self, link_id: Uuid) -> Result<()> {
        sqlx::query(r#"DELETE FROM links WHERE id = $1"#)
            .bind(link_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
