use crate::db::PostLookup;
use crate::error::{ForumError, Result};
use crate::metrics::content::CONTENT_TRANSFORM_TOTAL;
use crate::models::OffsetEncoding;
use crate::services::cross_reference::CrossReferenceResolver;
use crate::services::ner_client::EntityRecognizer;
use crate::services::redaction::redact_entities;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Turns raw user text into publishable post or comment content.
///
/// Two sequential steps:
/// 1. `#cfs<n>` tags pointing at existing posts become Markdown links.
/// 2. Person, location and organization names found by the NER service are
///    masked with placeholders over the already-linked text.
///
/// Fails with [`ForumError::InvalidContent`] when masking leaves nothing
/// readable and with [`ForumError::ExternalService`] when NER is unavailable.
/// A failed transform never yields partial output.
pub struct ContentTransformer {
    resolver: CrossReferenceResolver,
    recognizer: Arc<dyn EntityRecognizer>,
    offset_encoding: OffsetEncoding,
}

impl ContentTransformer {
    pub fn new(
        lookup: Arc<dyn PostLookup>,
        recognizer: Arc<dyn EntityRecognizer>,
        client_url: impl Into<String>,
    ) -> Self {
        Self {
            resolver: CrossReferenceResolver::new(lookup, client_url),
            recognizer,
            offset_encoding: OffsetEncoding::default(),
        }
    }

    pub fn with_offset_encoding(mut self, encoding: OffsetEncoding) -> Self {
        self.offset_encoding = encoding;
        self
    }

    pub async fn transform(&self, raw: &str) -> Result<String> {
        let result = self.run(raw).await;

        let outcome = match &result {
            Ok(_) => "accepted",
            Err(ForumError::InvalidContent(reason)) => {
                warn!(reason = %reason, "Content rejected after redaction");
                "rejected"
            }
            Err(e @ ForumError::ExternalService { .. }) => {
                error!(
                    error = %e,
                    retryable = e.is_transient(),
                    "Content transform aborted by external service failure"
                );
                "external_error"
            }
            Err(e) => {
                error!(error = %e, retryable = e.is_transient(), "Content transform failed");
                "error"
            }
        };
        CONTENT_TRANSFORM_TOTAL.with_label_values(&[outcome]).inc();

        result
    }

    async fn run(&self, raw: &str) -> Result<String> {
        let linked = self.resolver.resolve(raw).await?;
        let spans = self.recognizer.recognize(&linked).await?;

        debug!(spans = spans.len(), "Applying entity redaction");
        redact_entities(&linked, &spans, self.offset_encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockPostLookup;
    use crate::models::{EntitySpan, ResolvedPost};
    use crate::services::ner_client::MockEntityRecognizer;
    use uuid::Uuid;

    fn lookup_with(posts: Vec<ResolvedPost>) -> MockPostLookup {
        let mut lookup = MockPostLookup::new();
        lookup
            .expect_find_posts_by_reference_numbers()
            .returning(move |_| Ok(posts.clone()));
        lookup
    }

    fn recognizer_with(spans: Vec<EntitySpan>) -> MockEntityRecognizer {
        let mut recognizer = MockEntityRecognizer::new();
        recognizer
            .expect_recognize()
            .returning(move |_| Ok(spans.clone()));
        recognizer
    }

    #[tokio::test]
    async fn test_plain_text_is_unchanged() {
        let transformer = ContentTransformer::new(
            Arc::new(lookup_with(vec![])),
            Arc::new(recognizer_with(vec![])),
            "forum.example.com",
        );

        let text = "Just a regular post about nothing in particular.";
        assert_eq!(transformer.transform(text).await.unwrap(), text);
    }

    #[tokio::test]
    async fn test_ner_sees_linked_text() {
        let post = ResolvedPost::new(3, Uuid::nil());
        let expected = format!("[#cfs3]({}) hi", post.permalink("forum.example.com"));
        let sent = expected.clone();

        let mut recognizer = MockEntityRecognizer::new();
        recognizer
            .expect_recognize()
            .times(1)
            .returning(move |text| {
                assert_eq!(text, sent);
                Ok(vec![])
            });

        let transformer = ContentTransformer::new(
            Arc::new(lookup_with(vec![post])),
            Arc::new(recognizer),
            "forum.example.com",
        );

        assert_eq!(transformer.transform("#cfs3 hi").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_external_failure_propagates() {
        let mut recognizer = MockEntityRecognizer::new();
        recognizer
            .expect_recognize()
            .returning(|_| Err(ForumError::external("ner", "connection refused")));

        let transformer = ContentTransformer::new(
            Arc::new(lookup_with(vec![])),
            Arc::new(recognizer),
            "forum.example.com",
        );

        let err = transformer.transform("hello").await.unwrap_err();
        assert!(matches!(err, ForumError::ExternalService { .. }));
    }

    #[tokio::test]
    async fn test_offset_encoding_is_applied() {
        let transformer = ContentTransformer::new(
            Arc::new(lookup_with(vec![])),
            Arc::new(recognizer_with(vec![EntitySpan::new("PER", 2, 5)])),
            "forum.example.com",
        )
        .with_offset_encoding(OffsetEncoding::Char);

        assert_eq!(transformer.transform("😀 Lan").await.unwrap(), "😀 ⋆⋆⋆");
    }
}
