//! Length-preserving redaction of named entities.
//!
//! Span indices refer to the text exactly as it was sent to the NER service.
//! Every span is applied against those original offsets in one pass, so spans
//! may arrive unsorted or overlapping and no replacement shifts another span.

use crate::error::{ForumError, Result};
use crate::models::{EntitySpan, OffsetEncoding};

/// Glyph substituted for each non-whitespace character of a redacted entity
pub const PLACEHOLDER: char = '⋆';

/// Whitespace as web clients' `\s` sees it: Unicode `White_Space` plus the
/// byte order mark U+FEFF, minus NEXT LINE U+0085.
pub fn is_separator(c: char) -> bool {
    match c {
        '\u{feff}' => true,
        '\u{85}' => false,
        c => c.is_whitespace(),
    }
}

/// Replaces every non-whitespace character covered by a redactable span with
/// [`PLACEHOLDER`]. Whitespace and the character count are preserved.
///
/// A character is covered when its starting offset, measured in `encoding`
/// units, falls inside `[start_index, end_index)`. Spans past the end of the
/// text are clamped; empty or inverted spans cover nothing.
pub fn redact(text: &str, spans: &[EntitySpan], encoding: OffsetEncoding) -> String {
    let chars: Vec<char> = text.chars().collect();

    let mut offsets = Vec::with_capacity(chars.len());
    let mut offset = 0usize;
    for c in &chars {
        offsets.push(offset);
        offset += encoding.width(*c);
    }

    let mut covered = vec![false; chars.len()];
    for span in spans.iter().filter(|span| span.kind().is_some()) {
        if span.start_index >= span.end_index {
            continue;
        }
        let first = offsets.partition_point(|&o| o < span.start_index);
        let last = offsets.partition_point(|&o| o < span.end_index);
        for flag in &mut covered[first..last] {
            *flag = true;
        }
    }

    chars
        .iter()
        .zip(covered)
        .map(|(&c, hit)| {
            if hit && !is_separator(c) {
                PLACEHOLDER
            } else {
                c
            }
        })
        .collect()
}

/// True when nothing but placeholders remains once whitespace is ignored.
/// Text with no visible characters at all is not considered redacted.
pub fn is_fully_redacted(text: &str) -> bool {
    let mut visible = text.chars().filter(|&c| !is_separator(c)).peekable();
    visible.peek().is_some() && visible.all(|c| c == PLACEHOLDER)
}

/// Redacts `text` and rejects it when redaction left nothing readable.
pub fn redact_entities(
    text: &str,
    spans: &[EntitySpan],
    encoding: OffsetEncoding,
) -> Result<String> {
    let redacted = redact(text, spans, encoding);

    if is_fully_redacted(&redacted) {
        return Err(ForumError::InvalidContent(
            "content became entirely redacted".to_string(),
        ));
    }

    Ok(redacted)
}
