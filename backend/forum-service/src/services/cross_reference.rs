use crate::db::PostLookup;
use crate::error::Result;
use crate::metrics::content::CROSS_REFERENCES_RESOLVED_TOTAL;
use crate::models::{PostNumber, ResolvedPost};
use crate::services::redaction::is_separator;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref TAG_PATTERN: Regex =
        Regex::new(r"#cfs([0-9]+)").expect("Cross-reference regex pattern is valid");
    // ASCII word boundary so `#cfs42` never matches inside `#cfs420`
    static ref OCCURRENCE_PATTERN: Regex = Regex::new(r"#cfs([0-9]+)(?-u:\b)")
        .expect("Cross-reference occurrence regex pattern is valid");
}

/// Post numbers referenced by standalone `#cfs<n>` tags.
///
/// A tag only counts when it starts the text or follows whitespace, and ends
/// the text or is followed by whitespace. Numbers too large for a post number
/// are skipped.
pub fn extract_reference_numbers(text: &str) -> Vec<PostNumber> {
    let mut numbers = BTreeSet::new();

    for caps in TAG_PATTERN.captures_iter(text) {
        let (Some(tag), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let standalone_start = text[..tag.start()]
            .chars()
            .next_back()
            .map_or(true, is_separator);
        let standalone_end = text[tag.end()..]
            .chars()
            .next()
            .map_or(true, is_separator);

        if !(standalone_start && standalone_end) {
            continue;
        }

        if let Ok(number) = digits.as_str().parse::<PostNumber>() {
            numbers.insert(number);
        }
    }

    numbers.into_iter().collect()
}

/// Rewrites every occurrence of a resolved tag into a Markdown link.
///
/// All post numbers are handled in a single left-to-right pass, so text
/// inserted by one replacement is never rescanned. Tags whose digits are not
/// the canonical spelling of a resolved number (`#cfs042`) stay verbatim.
/// Returns the rewritten text and the number of replaced occurrences.
pub fn link_references(
    text: &str,
    resolved: &HashMap<PostNumber, ResolvedPost>,
    client_url: &str,
) -> (String, usize) {
    if resolved.is_empty() {
        return (text.to_string(), 0);
    }

    let mut replaced = 0;
    let linked = OCCURRENCE_PATTERN.replace_all(text, |caps: &Captures| {
        let digits = &caps[1];
        let post = digits
            .parse::<PostNumber>()
            .ok()
            .filter(|number| number.to_string() == digits)
            .and_then(|number| resolved.get(&number));

        match post {
            Some(post) => {
                replaced += 1;
                format!(
                    "[#cfs{}]({})",
                    post.post_number,
                    post.permalink(client_url)
                )
            }
            None => caps[0].to_string(),
        }
    });

    (linked.into_owned(), replaced)
}

/// First moderation step: turns `#cfs<n>` tags into links to existing posts.
pub struct CrossReferenceResolver {
    lookup: Arc<dyn PostLookup>,
    client_url: String,
}

impl CrossReferenceResolver {
    pub fn new(lookup: Arc<dyn PostLookup>, client_url: impl Into<String>) -> Self {
        Self {
            lookup,
            client_url: client_url.into(),
        }
    }

    pub async fn resolve(&self, text: &str) -> Result<String> {
        let numbers = extract_reference_numbers(text);
        if numbers.is_empty() {
            return Ok(text.to_string());
        }

        let posts = self.lookup.find_posts_by_reference_numbers(&numbers).await?;
        let resolved: HashMap<PostNumber, ResolvedPost> = posts
            .into_iter()
            .filter(|post| numbers.binary_search(&post.post_number).is_ok())
            .map(|post| (post.post_number, post))
            .collect();

        debug!(
            referenced = numbers.len(),
            resolved = resolved.len(),
            "Resolving cross references"
        );

        let (linked, replaced) = link_references(text, &resolved, &self.client_url);
        CROSS_REFERENCES_RESOLVED_TOTAL.inc_by(replaced as u64);

        Ok(linked)
    }
}
