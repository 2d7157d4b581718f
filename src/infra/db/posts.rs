use async_trait::async_trait;

use crate::application::repos::{PostStore, StoreError};
use crate::domain::entities::{NewPost, PostId, PostRecord};

use super::PostgresPostStore;
use super::types::PostRow;
use super::util::{map_sqlx_error, parse_key};

const BACKEND: &str = "postgres";

#[async_trait]
impl PostStore for PostgresPostStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn get_all(&self) -> Result<Vec<PostRecord>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, date, link, content
            FROM posts
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|err| map_sqlx_error("get_all", None, err))?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn get_by_id(&self, id: &PostId) -> Result<PostRecord, StoreError> {
        let key = parse_key(id)?;
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, date, link, content
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool())
        .await
        .map_err(|err| map_sqlx_error("get_by_id", Some(id), err))?;

        row.map(PostRecord::from)
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// The serial key is authoritative; a caller-supplied id is ignored.
    async fn add(&self, post: NewPost) -> Result<PostId, StoreError> {
        let NewPost { fields, .. } = post;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (title, date, link, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(fields.title)
        .bind(fields.date)
        .bind(fields.link)
        .bind(fields.content)
        .fetch_one(self.pool())
        .await
        .map_err(|err| map_sqlx_error("add", None, err))?;

        Ok(PostId::from(id))
    }

    async fn update(&self, post: PostRecord) -> Result<(), StoreError> {
        let PostRecord { id, fields } = post;
        let key = parse_key(&id)?;
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2,
                date = $3,
                link = $4,
                content = $5
            WHERE id = $1
            "#,
        )
        .bind(key)
        .bind(fields.title)
        .bind(fields.date)
        .bind(fields.link)
        .bind(fields.content)
        .execute(self.pool())
        .await
        .map_err(|err| map_sqlx_error("update", Some(&id), err))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(&id));
        }
        Ok(())
    }
}
