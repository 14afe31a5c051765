//! Response parsing.
//!
//! Accepted shapes, in order: the whole reply is a JSON array of strings;
//! the first `[...]` substring is one. Anything else is malformed. Labels
//! are trimmed, blanks dropped and duplicates removed ignoring case.

use crate::error::ClassifierError;

pub(crate) const EXCERPT_LEN: usize = 120;

/// Extract the label list from a model reply.
pub fn parse_labels(reply: &str) -> Result<Vec<String>, ClassifierError> {
    let trimmed = reply.trim();
    if let Ok(labels) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Ok(clean(labels));
    }
    for slice in bracketed(trimmed) {
        if let Ok(labels) = serde_json::from_str::<Vec<String>>(slice) {
            return Ok(clean(labels));
        }
    }
    Err(ClassifierError::MalformedResponse {
        excerpt: excerpt(trimmed),
    })
}

/// The first `EXCERPT_LEN` characters of `text`.
pub(crate) fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}

/// Every `[...]` slice of `s`, shortest first for each opening bracket.
fn bracketed(s: &str) -> impl Iterator<Item = &str> {
    s.match_indices('[').flat_map(move |(start, _)| {
        s[start..]
            .match_indices(']')
            .map(move |(len, _)| &s[start..=start + len])
    })
}

fn clean(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if label.is_empty() || out.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            continue;
        }
        out.push(label.to_string());
    }
    out
}
