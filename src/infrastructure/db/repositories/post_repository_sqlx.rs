use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use crate::application::ports::post_repository::{PostRepository, PostUnitOfWork, TagStore};
use crate::application::services::posts::like_pattern;
use crate::domain::posts::post::{PostDraft, PostRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxPostRepository {
    pub pool: PgPool,
}

impl SqlxPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(r: PgRow) -> PostRow {
    PostRow {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        category: r.get("category"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        tag: r.get::<Option<String>, _>("tag"),
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn begin(&self) -> anyhow::Result<Box<dyn PostUnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqlxPostUnitOfWork { tx }))
    }

    async fn list_rows(&self, term: Option<&str>) -> anyhow::Result<Vec<PostRow>> {
        let rows = if let Some(t) = term {
            // Filter whole posts so a tag hit still returns every tag of the post
            sqlx::query(
                r#"SELECT p.id, p.title, p.content, p.category, p.created_at, p.updated_at,
                          t.name AS tag
                   FROM posts p
                   LEFT JOIN post_tags pt ON pt.post_id = p.id
                   LEFT JOIN tags t ON t.id = pt.tag_id
                   WHERE p.title ILIKE $1
                      OR p.content ILIKE $1
                      OR p.category ILIKE $1
                      OR EXISTS (
                          SELECT 1 FROM post_tags mpt
                          JOIN tags mt ON mt.id = mpt.tag_id
                          WHERE mpt.post_id = p.id AND mt.name ILIKE $1
                      )
                   ORDER BY p.id, t.name"#,
            )
            .bind(like_pattern(t))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"SELECT p.id, p.title, p.content, p.category, p.created_at, p.updated_at,
                          t.name AS tag
                   FROM posts p
                   LEFT JOIN post_tags pt ON pt.post_id = p.id
                   LEFT JOIN tags t ON t.id = pt.tag_id
                   ORDER BY p.id, t.name"#,
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn get_rows(&self, id: i64) -> anyhow::Result<Vec<PostRow>> {
        let rows = sqlx::query(
            r#"SELECT p.id, p.title, p.content, p.category, p.created_at, p.updated_at,
                      t.name AS tag
               FROM posts p
               LEFT JOIN post_tags pt ON pt.post_id = p.id
               LEFT JOIN tags t ON t.id = pt.tag_id
               WHERE p.id = $1
               ORDER BY t.name"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        // post_tags rows go with it through ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// A unit-of-work over one pooled connection. Dropping the transaction
/// without commit rolls it back and returns the connection to the pool.
pub struct SqlxPostUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TagStore for SqlxPostUnitOfWork {
    async fn find_tag_id(&mut self, name: &str) -> anyhow::Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(id)
    }

    async fn insert_tag(&mut self, name: &str) -> anyhow::Result<Option<i64>> {
        // DO NOTHING yields no row when the name is already taken, including by
        // a concurrent transaction that committed while we waited on the index
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO tags(name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id)
    }
}

#[async_trait]
impl PostUnitOfWork for SqlxPostUnitOfWork {
    async fn insert_post(&mut self, draft: &PostDraft) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO posts (title, content, category)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.category)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn lock_post(&mut self, id: i64) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.is_some())
    }

    async fn update_post(&mut self, id: i64, draft: &PostDraft) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE posts SET
                    title = $1,
                    content = $2,
                    category = $3,
                    updated_at = now()
                WHERE id = $4"#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.category)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn clear_post_tags(&mut self, post_id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn link_post_tag(&mut self, post_id: i64, tag_id: i64) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO post_tags(post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }
}
