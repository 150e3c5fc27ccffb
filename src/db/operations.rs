use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::models::User;
use crate::db::store::UserStore;
use crate::error::{AppError, DatabaseError};
use crate::feed::{ContentRef, FeedStore, TagMatch};
use crate::Result;

const USER_COLUMNS: &str = "id, email, display_name, password_hash, created_at";

pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::QueryError(e.to_string())))
    }

    pub async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        Ok(self.pool.as_ref().begin().await?)
    }
}

#[derive(FromRow)]
struct TagMatchRow {
    id: Uuid,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    matched_tag_count: i64,
}

impl From<TagMatchRow> for TagMatch {
    fn from(row: TagMatchRow) -> Self {
        TagMatch {
            content: ContentRef {
                id: row.id,
                author_id: row.author_id,
                created_at: row.created_at,
            },
            matched_tag_count: row.matched_tag_count,
        }
    }
}

#[async_trait]
impl FeedStore for DbOperations {
    async fn viewer_exists(&self, viewer_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(viewer_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn followed_author_ids(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT followee_id FROM follows WHERE follower_id = $1")
            .bind(viewer_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn interest_labels(&self, viewer_id: Uuid) -> Result<HashSet<String>> {
        let labels = sqlx::query_scalar::<_, String>("SELECT label FROM user_interests WHERE user_id = $1")
            .bind(viewer_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(labels.into_iter().collect())
    }

    async fn recent_by_authors(&self, author_ids: &[Uuid], limit: i64) -> Result<Vec<ContentRef>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = sqlx::query_as::<_, ContentRef>(
            r#"
            SELECT id, author_id, created_at
            FROM posts
            WHERE author_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(author_ids.to_vec())
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(posts)
    }

    async fn recent_by_tag_labels(
        &self,
        labels: &[String],
        exclude_author: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<TagMatch>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TagMatchRow>(
            r#"
            SELECT p.id, p.author_id, p.created_at, COUNT(*) AS matched_tag_count
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            JOIN tags t ON t.id = pt.tag_id
            WHERE LOWER(t.label) = ANY($1)
              AND ($2::uuid IS NULL OR p.author_id <> $2)
            GROUP BY p.id, p.author_id, p.created_at
            ORDER BY matched_tag_count DESC, p.created_at DESC, p.id DESC
            LIMIT $3
            "#,
        )
        .bind(labels.to_vec())
        .bind(exclude_author)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(TagMatch::from).collect())
    }

    async fn global_recent(
        &self,
        exclude_author: Option<Uuid>,
        exclude_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<ContentRef>> {
        let posts = sqlx::query_as::<_, ContentRef>(
            r#"
            SELECT id, author_id, created_at
            FROM posts
            WHERE ($1::uuid IS NULL OR author_id <> $1)
              AND NOT (id = ANY($2))
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(exclude_author)
        .bind(exclude_ids.to_vec())
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(posts)
    }
}

#[async_trait]
impl UserStore for DbOperations {
    async fn create_user(&self, user: &User) -> Result<User> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn get_interests(&self, user_id: Uuid) -> Result<Vec<String>> {
        let labels = sqlx::query_scalar::<_, String>(
            "SELECT label FROM user_interests WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(labels)
    }

    async fn replace_interests(&self, user_id: Uuid, labels: &[String]) -> Result<()> {
        let mut transaction = self.begin_transaction().await?;

        let result = async {
            sqlx::query("DELETE FROM user_interests WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *transaction)
                .await?;

            if !labels.is_empty() {
                sqlx::query(
                    r#"
                    INSERT INTO user_interests (user_id, label, position)
                    SELECT $1, label, position::int
                    FROM UNNEST($2::text[]) WITH ORDINALITY AS t(label, position)
                    "#,
                )
                .bind(user_id)
                .bind(labels.to_vec())
                .execute(&mut *transaction)
                .await?;
            }
            Ok::<(), sqlx::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                transaction.commit().await?;
                Ok(())
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e.into())
            }
        }
    }
}
