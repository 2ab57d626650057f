//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_service::{
    sort_posts, EntityRecognizer, EntitySpan, ForumError, PostLookup, PostNumber, PostStore,
    RankablePost, ResolvedPost, Result, SortMode,
};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub const CLIENT_URL: &str = "forum.example.com";

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<RankablePost>>,
    counter: AtomicI64,
    pub lookups: AtomicUsize,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, upvotes: i64, downvotes: i64, created_at: DateTime<Utc>) -> RankablePost {
        let post_number = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let post = RankablePost {
            id: Uuid::new_v4(),
            post_number,
            title: format!("post {}", post_number),
            upvote_count: upvotes,
            downvote_count: downvotes,
            created_at,
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }
}

#[async_trait]
impl PostLookup for InMemoryPostStore {
    async fn find_posts_by_reference_numbers(
        &self,
        numbers: &[PostNumber],
    ) -> Result<Vec<ResolvedPost>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| numbers.contains(&p.post_number))
            .map(|p| ResolvedPost::new(p.post_number, p.id))
            .collect())
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn allocate_post_number(&self) -> Result<PostNumber> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn list_rankable_posts(&self, mode: SortMode, limit: i64) -> Result<Vec<RankablePost>> {
        let posts = self.posts.lock().unwrap().clone();
        let mut posts = sort_posts(posts, mode);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn count_posts(&self) -> Result<i64> {
        Ok(self.posts.lock().unwrap().len() as i64)
    }
}

/// Recognizer that flags every occurrence of the given words as people
pub struct WordRecognizer {
    words: Vec<String>,
    pub calls: AtomicUsize,
}

impl WordRecognizer {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EntityRecognizer for WordRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Offsets in UTF-16 units, the way the real service reports them
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut spans = Vec::new();
        for word in &self.words {
            let needle: Vec<u16> = word.encode_utf16().collect();
            if needle.is_empty() || needle.len() > units.len() {
                continue;
            }
            for start in 0..=units.len() - needle.len() {
                if units[start..start + needle.len()] == needle[..] {
                    spans.push(EntitySpan::new("PER", start, start + needle.len()));
                }
            }
        }
        // The service makes no ordering promise
        spans.reverse();
        Ok(spans)
    }
}

/// Recognizer standing in for an unreachable NER endpoint
pub struct UnreachableRecognizer;

#[async_trait]
impl EntityRecognizer for UnreachableRecognizer {
    async fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        Err(ForumError::external("ner", "connection refused"))
    }
}
