use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sequence number handed out at post creation; `#cfs<n>` tags refer to it.
pub type PostNumber = i64;

/// A post number resolved to the post it was assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ResolvedPost {
    pub post_number: PostNumber,
    pub id: Uuid,
}

impl ResolvedPost {
    pub fn new(post_number: PostNumber, id: Uuid) -> Self {
        Self { post_number, id }
    }

    /// Public URL of the post. `client_url` carries no scheme.
    pub fn permalink(&self, client_url: &str) -> String {
        format!("http://{}/posts/{}", client_url, self.id)
    }
}

/// Aggregate vote counters of a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl VoteTally {
    pub fn new(upvotes: u64, downvotes: u64) -> Self {
        Self { upvotes, downvotes }
    }

    /// Upvotes minus downvotes, saturating at the `i64` range.
    pub fn margin(&self) -> i64 {
        let up = i64::try_from(self.upvotes).unwrap_or(i64::MAX);
        let down = i64::try_from(self.downvotes).unwrap_or(i64::MAX);
        up.saturating_sub(down)
    }
}

/// Listing row with everything the ranker needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RankablePost {
    pub id: Uuid,
    pub post_number: PostNumber,
    pub title: String,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub created_at: DateTime<Utc>,
}

impl RankablePost {
    pub fn tally(&self) -> VoteTally {
        VoteTally::new(
            u64::try_from(self.upvote_count).unwrap_or(0),
            u64::try_from(self.downvote_count).unwrap_or(0),
        )
    }
}

/// A post paired with its trending score. Only lives for one listing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPost<T> {
    #[serde(flatten)]
    pub post: T,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permalink() {
        let id = Uuid::nil();
        let post = ResolvedPost::new(42, id);
        assert_eq!(
            post.permalink("forum.example.com"),
            "http://forum.example.com/posts/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_margin_signed() {
        assert_eq!(VoteTally::new(5, 3).margin(), 2);
        assert_eq!(VoteTally::new(1, 4).margin(), -3);
        assert_eq!(VoteTally::new(u64::MAX, 0).margin(), i64::MAX);
    }

    #[test]
    fn test_negative_counters_clamp_to_zero() {
        let post = RankablePost {
            id: Uuid::new_v4(),
            post_number: 1,
            title: "t".into(),
            upvote_count: -2,
            downvote_count: 3,
            created_at: Utc::now(),
        };
        assert_eq!(post.tally(), VoteTally::new(0, 3));
    }
}
