//! Post persistence used by the moderation and ranking pipeline.
//!
//! The pipeline only needs to resolve post numbers and list rankable posts;
//! everything else about posts belongs to the CRUD layer.

use crate::error::Result;
use crate::models::{PostNumber, RankablePost, ResolvedPost};
use crate::services::trending::{SortMode, DECAY_SECONDS, EPOCH_UNIX_SECONDS};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Resolves `#cfs<n>` post numbers to post identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostLookup: Send + Sync {
    /// Batch lookup. Numbers without a post are simply absent from the result.
    async fn find_posts_by_reference_numbers(
        &self,
        numbers: &[PostNumber],
    ) -> Result<Vec<ResolvedPost>>;
}

#[async_trait]
pub trait PostStore: PostLookup {
    /// Next post number from the shared counter
    async fn allocate_post_number(&self) -> Result<PostNumber>;

    /// The first `limit` posts of the whole collection in `mode` order.
    /// Ordering happens before the limit, so old posts compete with new ones.
    async fn list_rankable_posts(&self, mode: SortMode, limit: i64) -> Result<Vec<RankablePost>>;

    async fn count_posts(&self) -> Result<i64>;
}

/// `ORDER BY` clause matching the comparators in `services::trending`.
fn order_by(mode: SortMode) -> String {
    match mode {
        SortMode::Newest => "created_at DESC, id ASC".to_string(),
        SortMode::Oldest => "created_at ASC, id ASC".to_string(),
        SortMode::MostUpvoted => "upvote_count DESC, created_at DESC, id ASC".to_string(),
        SortMode::LeastUpvoted => "upvote_count ASC, created_at DESC, id ASC".to_string(),
        SortMode::Trending => format!(
            "(LOG(GREATEST(ABS((GREATEST(upvote_count, 0) - GREATEST(downvote_count, 0))::float8), 1)) \
             + SIGN((GREATEST(upvote_count, 0) - GREATEST(downvote_count, 0))::float8) \
             * (EXTRACT(EPOCH FROM created_at)::float8 - {}) / {}) DESC, \
             created_at DESC, id ASC",
            EPOCH_UNIX_SECONDS, DECAY_SECONDS
        ),
    }
}

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostLookup for PgPostStore {
    async fn find_posts_by_reference_numbers(
        &self,
        numbers: &[PostNumber],
    ) -> Result<Vec<ResolvedPost>> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }

        let posts = sqlx::query_as::<_, ResolvedPost>(
            r#"
            SELECT post_number, id
            FROM posts
            WHERE post_number = ANY($1)
            "#,
        )
        .bind(numbers)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            requested = numbers.len(),
            found = posts.len(),
            "Resolved post references"
        );

        Ok(posts)
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn allocate_post_number(&self) -> Result<PostNumber> {
        // Single statement so concurrent creators never share a number
        let (value,) = sqlx::query_as::<_, (i64,)>(
            r#"
            UPDATE post_counters
            SET value = value + 1
            WHERE name = 'post_number'
            RETURNING value
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    async fn list_rankable_posts(&self, mode: SortMode, limit: i64) -> Result<Vec<RankablePost>> {
        let query = format!(
            r#"
            SELECT id, post_number, title, upvote_count, downvote_count, created_at
            FROM posts
            ORDER BY {}
            LIMIT $1
            "#,
            order_by(mode)
        );

        let posts = sqlx::query_as::<_, RankablePost>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(?mode, limit, returned = posts.len(), "Listed posts");

        Ok(posts)
    }

    async fn count_posts(&self) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
