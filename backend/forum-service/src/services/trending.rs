//! Trending ("hot") ranking for post listings.
//!
//! `score = log10(max(1, |margin|)) + sign(margin) * age / 12h`, with age
//! measured from a fixed epoch. Net-positive posts gain one order of magnitude
//! of votes every 12 hours of age, net-negative posts lose one, and posts with
//! a zero margin never move.

use crate::error::ForumError;
use crate::models::{RankablePost, ScoredPost, VoteTally};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

/// 2023-04-05T00:00:00Z
pub const EPOCH_UNIX_SECONDS: i64 = 1_680_652_800;

/// Seconds of age worth one order of magnitude of vote margin
pub const DECAY_SECONDS: f64 = 43_200.0;

/// Seconds between the epoch and `created_at`, millisecond precision.
/// Negative for posts older than the epoch.
pub fn age_seconds(created_at: DateTime<Utc>) -> f64 {
    (created_at.timestamp_millis() - EPOCH_UNIX_SECONDS * 1000) as f64 / 1000.0
}

pub fn trending_score(upvotes: u64, downvotes: u64, created_at: DateTime<Utc>) -> f64 {
    let margin = VoteTally::new(upvotes, downvotes).margin();
    let sign = margin.signum() as f64;
    let order = margin.unsigned_abs().max(1) as f64;

    order.log10() + sign * age_seconds(created_at) / DECAY_SECONDS
}

/// Anything a listing can rank
pub trait Rankable {
    fn post_id(&self) -> Uuid;
    fn tally(&self) -> VoteTally;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Rankable for RankablePost {
    fn post_id(&self) -> Uuid {
        self.id
    }

    fn tally(&self) -> VoteTally {
        RankablePost::tally(self)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Newer first, then by id, so equal keys still have one fixed order.
fn newest_first<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| a.post_id().cmp(&b.post_id()))
}

/// Scores every post and orders by score, highest first.
///
/// Equal scores fall back to creation time (newest first) and then post id,
/// which makes the result independent of the input order.
pub fn rank_trending<T: Rankable>(posts: Vec<T>) -> Vec<ScoredPost<T>> {
    let mut scored: Vec<ScoredPost<T>> = posts
        .into_iter()
        .map(|post| {
            let tally = post.tally();
            let score = trending_score(tally.upvotes, tally.downvotes, post.created_at());
            ScoredPost { post, score }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| newest_first(&a.post, &b.post))
    });

    scored
}

/// Listing order requested through `sortBy`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    MostUpvoted,
    LeastUpvoted,
    Trending,
}

impl FromStr for SortMode {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-createdAt" => Ok(SortMode::Newest),
            "createdAt" => Ok(SortMode::Oldest),
            "-upvoteCount" => Ok(SortMode::MostUpvoted),
            "upvoteCount" => Ok(SortMode::LeastUpvoted),
            "trending" => Ok(SortMode::Trending),
            other => Err(ForumError::InvalidInput(format!(
                "unsupported sortBy value: {}",
                other
            ))),
        }
    }
}

/// Orders posts without exposing scores. Trending delegates to
/// [`rank_trending`].
pub fn sort_posts<T: Rankable>(mut posts: Vec<T>, mode: SortMode) -> Vec<T> {
    match mode {
        SortMode::Newest => posts.sort_by(newest_first),
        SortMode::Oldest => posts.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.post_id().cmp(&b.post_id()))
        }),
        SortMode::MostUpvoted => posts.sort_by(|a, b| {
            b.tally()
                .upvotes
                .cmp(&a.tally().upvotes)
                .then_with(|| newest_first(a, b))
        }),
        SortMode::LeastUpvoted => posts.sort_by(|a, b| {
            a.tally()
                .upvotes
                .cmp(&b.tally().upvotes)
                .then_with(|| newest_first(a, b))
        }),
        SortMode::Trending => {
            return rank_trending(posts).into_iter().map(|p| p.post).collect();
        }
    }
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(EPOCH_UNIX_SECONDS, 0).unwrap()
    }

    fn post(upvotes: i64, downvotes: i64, created_at: DateTime<Utc>) -> RankablePost {
        RankablePost {
            id: Uuid::new_v4(),
            post_number: 0,
            title: String::new(),
            upvote_count: upvotes,
            downvote_count: downvotes,
            created_at,
        }
    }

    #[test]
    fn test_epoch_constant() {
        assert_eq!(
            epoch(),
            Utc.with_ymd_and_hms(2023, 4, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_zero_margin_at_epoch_is_zero() {
        assert_eq!(trending_score(0, 0, epoch()), 0.0);
    }

    #[test]
    fn test_zero_margin_ignores_age() {
        let later = epoch() + Duration::days(30);
        assert_eq!(trending_score(7, 7, later), 0.0);
    }

    #[test]
    fn test_worked_example() {
        let created_at = epoch() + Duration::seconds(43_200);
        let score = trending_score(5, 3, created_at);
        assert!((score - (2f64.log10() + 1.0)).abs() < 1e-12);
        assert!((score - 1.301).abs() < 1e-3);
    }

    #[test]
    fn test_age_direction_follows_margin_sign() {
        let early = epoch() + Duration::hours(1);
        let late = epoch() + Duration::hours(30);

        assert!(trending_score(4, 1, late) > trending_score(4, 1, early));
        assert!(trending_score(1, 4, late) < trending_score(1, 4, early));
    }

    #[test]
    fn test_margin_is_log_scaled() {
        let t = epoch() + Duration::hours(5);
        let ten = trending_score(10, 0, t);
        let two = trending_score(2, 0, t);

        assert!(ten > two);
        assert!(((ten - two) - (10f64.log10() - 2f64.log10())).abs() < 1e-12);
    }

    #[test]
    fn test_rank_is_input_order_independent() {
        let t = epoch() + Duration::days(2);
        let posts = vec![
            post(3, 0, t),
            post(3, 0, t),
            post(0, 0, t - Duration::hours(4)),
            post(0, 0, t),
            post(10, 2, t - Duration::hours(1)),
            post(1, 6, t),
        ];

        let forward: Vec<Uuid> = rank_trending(posts.clone())
            .into_iter()
            .map(|p| p.post.id)
            .collect();
        let mut reversed_input = posts;
        reversed_input.reverse();
        let backward: Vec<Uuid> = rank_trending(reversed_input)
            .into_iter()
            .map(|p| p.post.id)
            .collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_rank_ties_prefer_newer_posts() {
        let older = post(0, 0, epoch() + Duration::hours(1));
        let newer = post(0, 0, epoch() + Duration::hours(2));

        let ranked = rank_trending(vec![older.clone(), newer.clone()]);
        assert_eq!(ranked[0].post.id, newer.id);
        assert_eq!(ranked[1].post.id, older.id);
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let t = epoch() + Duration::days(1);
        let sinking = post(0, 5, t);
        let flat = post(2, 2, t);
        let rising = post(5, 0, t);

        let ranked = rank_trending(vec![sinking.clone(), flat.clone(), rising.clone()]);
        let ids: Vec<Uuid> = ranked.iter().map(|p| p.post.id).collect();
        assert_eq!(ids, vec![rising.id, flat.id, sinking.id]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("trending".parse::<SortMode>().unwrap(), SortMode::Trending);
        assert_eq!("-createdAt".parse::<SortMode>().unwrap(), SortMode::Newest);
        assert_eq!("upvoteCount".parse::<SortMode>().unwrap(), SortMode::LeastUpvoted);
        assert!(matches!(
            "title".parse::<SortMode>(),
            Err(ForumError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sort_posts_non_trending_orders() {
        let t = epoch() + Duration::days(3);
        let a = post(1, 0, t - Duration::hours(2));
        let b = post(9, 0, t - Duration::hours(1));
        let c = post(4, 0, t);
        let input = vec![a.clone(), b.clone(), c.clone()];

        let ids = |posts: Vec<RankablePost>| posts.into_iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(ids(sort_posts(input.clone(), SortMode::Newest)), vec![c.id, b.id, a.id]);
        assert_eq!(ids(sort_posts(input.clone(), SortMode::Oldest)), vec![a.id, b.id, c.id]);
        assert_eq!(
            ids(sort_posts(input.clone(), SortMode::MostUpvoted)),
            vec![b.id, c.id, a.id]
        );
        assert_eq!(
            ids(sort_posts(input, SortMode::LeastUpvoted)),
            vec![a.id, c.id, b.id]
        );
    }
}
