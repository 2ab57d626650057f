pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use db::{PgPostStore, PostLookup, PostStore};
pub use error::{ForumError, Result};
pub use models::{
    EntitySpan, EntityType, OffsetEncoding, PostNumber, RankablePost, ResolvedPost, ScoredPost,
    VoteTally,
};
pub use services::{
    rank_trending, sort_posts, trending_score, ContentTransformer, EntityRecognizer, NerClient,
    PostingCooldown, ProfanityFilter, Rankable, SortMode,
};
