//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the store ports from the `askaway_core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use askaway_core::domain::{
    NewQuestion, NewUser, Ordering, Page, PageRequest, ProfileUpdate, Question, QuestionFilter,
    QuestionUpdate, TagSummary, User, Vote, DEFAULT_AVATAR,
};
use askaway_core::ports::{
    PortError, PortResult, QuestionStore, TagStore, UserStore, VoteStore,
};
use askaway_core::slug::slugify;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports over PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Shared SELECT head for question queries: one row per question with the
/// author username joined in and the tag set aggregated into an array.
const QUESTION_SELECT: &str = "SELECT q.id, q.title, q.details, q.slug, q.published_at, \
     q.view_count, q.answered, q.rating, q.section, q.author_id, \
     u.username AS author, \
     COALESCE(array_agg(t.tag ORDER BY t.tag) FILTER (WHERE t.tag IS NOT NULL), '{}') AS tags \
     FROM questions q \
     JOIN users u ON u.id = q.author_id \
     LEFT JOIN question_tags t ON t.question_id = q.id \
     WHERE 1=1";

const QUESTION_GROUP: &str = " GROUP BY q.id, u.username";

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Escapes LIKE metacharacters so user-entered search text matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if c == '%' || c == '_' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Appends the filter's WHERE clauses; shared by the listing and count queries.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &QuestionFilter) {
    if let Some(tag) = &filter.tag {
        qb.push(" AND EXISTS (SELECT 1 FROM question_tags qt WHERE qt.question_id = q.id AND qt.tag = ");
        qb.push_bind(tag.clone());
        qb.push(")");
    }
    if let Some(query) = &filter.query {
        qb.push(" AND q.title ILIKE ");
        qb.push_bind(like_pattern(query));
    }
    if let Some(author) = &filter.author {
        qb.push(" AND u.username = ");
        qb.push_bind(author.clone());
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct QuestionRecord {
    id: Uuid,
    title: String,
    details: String,
    slug: String,
    published_at: DateTime<Utc>,
    view_count: i64,
    answered: bool,
    rating: i64,
    section: String,
    author_id: Uuid,
    author: String,
    tags: Vec<String>,
}

impl QuestionRecord {
    fn to_domain(self) -> Question {
        Question {
            id: self.id,
            title: self.title,
            details: self.details,
            slug: self.slug,
            published_at: self.published_at,
            view_count: self.view_count as u64,
            answered: self.answered,
            rating: self.rating,
            section: self.section,
            author_id: self.author_id,
            author: self.author,
            tags: self.tags,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: Option<String>,
    registered_at: DateTime<Utc>,
    rating: i64,
    about: String,
    avatar: String,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            registered_at: self.registered_at,
            rating: self.rating,
            about: self.about,
            avatar: self.avatar,
        }
    }
}

#[derive(FromRow)]
struct TagRecord {
    name: String,
    question_count: i64,
}

//=========================================================================================
// `QuestionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionStore for PgStore {
    async fn create(&self, question: NewQuestion) -> PortResult<Question> {
        let id = Uuid::new_v4();
        let slug = slugify(&question.title);

        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO questions (id, title, details, slug, section, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&question.title)
        .bind(&question.details)
        .bind(&slug)
        .bind(&question.section)
        .bind(question.author_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_foreign_key_violation() => PortError::Integrity(format!(
                "Author {} does not exist",
                question.author_id
            )),
            _ => unexpected(e),
        })?;

        for tag in &question.tags {
            sqlx::query(
                "INSERT INTO question_tags (question_id, tag) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(tag)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;

        self.question_by_id(id).await
    }

    async fn question_by_id(&self, id: Uuid) -> PortResult<Question> {
        let mut qb = QueryBuilder::<Postgres>::new(QUESTION_SELECT);
        qb.push(" AND q.id = ");
        qb.push_bind(id);
        qb.push(QUESTION_GROUP);

        let record: QuestionRecord = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Question {} not found", id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn record_view(&self, id: Uuid) -> PortResult<Question> {
        // A single conditional UPDATE keeps the increment atomic under
        // concurrent detail views.
        let result = sqlx::query("UPDATE questions SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Question {} not found", id)));
        }

        self.question_by_id(id).await
    }

    async fn update(&self, id: Uuid, update: QuestionUpdate) -> PortResult<Question> {
        let slug = slugify(&update.title);

        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result = sqlx::query(
            "UPDATE questions SET title = $2, details = $3, section = $4, slug = $5 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.details)
        .bind(&update.section)
        .bind(&slug)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Question {} not found", id)));
        }

        sqlx::query("DELETE FROM question_tags WHERE question_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for tag in &update.tags {
            sqlx::query("INSERT INTO question_tags (question_id, tag) VALUES ($1, $2)")
                .bind(id)
                .bind(tag)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;

        self.question_by_id(id).await
    }

    async fn list(
        &self,
        filter: &QuestionFilter,
        order: Ordering,
        page: PageRequest,
    ) -> PortResult<Page<Question>> {
        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM questions q JOIN users u ON u.id = q.author_id WHERE 1=1",
        );
        push_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        let mut qb = QueryBuilder::<Postgres>::new(QUESTION_SELECT);
        push_filter(&mut qb, filter);
        qb.push(QUESTION_GROUP);
        match order {
            Ordering::Recency => qb.push(" ORDER BY q.published_at DESC"),
            Ordering::Popularity => qb.push(" ORDER BY q.rating DESC, q.published_at DESC"),
        };
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.size));
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let records: Vec<QuestionRecord> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(Page {
            items: records.into_iter().map(|r| r.to_domain()).collect(),
            page: page.page,
            size: page.size,
            total: total as u64,
        })
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let record: UserRecord = sqlx::query_as(
            "INSERT INTO users (id, username, email, about, avatar) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, username, email, registered_at, rating, about, avatar",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.about)
        .bind(DEFAULT_AVATAR)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Username '{}' is taken", user.username))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn user_by_username(&self, username: &str) -> PortResult<User> {
        let record: UserRecord = sqlx::query_as(
            "SELECT id, username, email, registered_at, rating, about, avatar \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User '{}' not found", username))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_users(&self, page: PageRequest) -> PortResult<Page<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        let records: Vec<UserRecord> = sqlx::query_as(
            "SELECT id, username, email, registered_at, rating, about, avatar \
             FROM users ORDER BY username ASC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(page.size))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(Page {
            items: records.into_iter().map(|r| r.to_domain()).collect(),
            page: page.page,
            size: page.size,
            total: total as u64,
        })
    }

    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> PortResult<User> {
        let record: UserRecord = sqlx::query_as(
            "UPDATE users SET about = COALESCE($2, about), avatar = COALESCE($3, avatar) \
             WHERE username = $1 \
             RETURNING id, username, email, registered_at, rating, about, avatar",
        )
        .bind(username)
        .bind(&update.about)
        .bind(&update.avatar)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User '{}' not found", username))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `TagStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TagStore for PgStore {
    async fn list_tags(&self) -> PortResult<Vec<TagSummary>> {
        let records: Vec<TagRecord> = sqlx::query_as(
            "SELECT tag AS name, COUNT(*) AS question_count \
             FROM question_tags GROUP BY tag \
             ORDER BY question_count DESC, tag ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(|r| TagSummary {
                name: r.name,
                question_count: r.question_count as u64,
            })
            .collect())
    }
}

//=========================================================================================
// `VoteStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl VoteStore for PgStore {
    async fn apply_vote(&self, question_id: Uuid, voter_id: Uuid, vote: Vote) -> PortResult<i64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO votes (question_id, voter_id, value) VALUES ($1, $2, $3) \
             ON CONFLICT (question_id, voter_id) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(question_id)
        .bind(voter_id)
        .bind(vote.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_foreign_key_violation() => {
                PortError::NotFound(format!("Question {} not found", question_id))
            }
            _ => unexpected(e),
        })?;

        let rating: i64 = sqlx::query_scalar(
            "UPDATE questions \
             SET rating = (SELECT COALESCE(SUM(value), 0)::bigint FROM votes WHERE question_id = $1) \
             WHERE id = $1 RETURNING rating",
        )
        .bind(question_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Question {} not found", question_id))
            }
            _ => unexpected(e),
        })?;

        tx.commit().await.map_err(unexpected)?;

        Ok(rating)
    }
}
