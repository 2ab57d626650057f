use crate::error::{ForumError, Result};
use regex::{Captures, Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Masks profane words with asterisks before titles and bodies are stored
pub struct ProfanityFilter {
    words: BTreeSet<String>,
    pattern: Option<Regex>,
}

impl ProfanityFilter {
    /// Load the word list from a file: one word per line, `#` comments allowed
    pub fn new(words_file: impl AsRef<Path>) -> Result<Self> {
        let path = words_file.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ForumError::Config(format!(
                "Failed to load profanity words from {}: {}",
                path.display(),
                e
            ))
        })?;

        let words = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string);

        Self::from_words(words)
    }

    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: BTreeSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let pattern = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
                .case_insensitive(true)
                .build()
                .map_err(|e| ForumError::Config(format!("Invalid profanity word list: {}", e)))?;
            Some(regex)
        };

        Ok(Self { words, pattern })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_profane(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(false, |pattern| pattern.is_match(text))
    }

    /// Replaces each character of every profane word with `*`
    pub fn clean(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(text, |caps: &Captures| "*".repeat(caps[0].chars().count()))
                .into_owned(),
            None => text.to_string(),
        }
    }
}
