pub mod content_transformer;
pub mod cooldown;
pub mod cross_reference;
pub mod ner_client;
pub mod profanity;
pub mod redaction;
pub mod trending;

pub use content_transformer::ContentTransformer;
pub use cooldown::PostingCooldown;
pub use cross_reference::CrossReferenceResolver;
pub use ner_client::{EntityRecognizer, NerClient, RetryPolicy};
pub use profanity::ProfanityFilter;
pub use trending::{rank_trending, sort_posts, trending_score, Rankable, SortMode};
