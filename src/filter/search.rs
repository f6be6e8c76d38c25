//! Query matching
//!
//! Scores file content against a user search string and extracts a compact
//! snippet for display. Matching is a case-insensitive substring search;
//! the score is the occurrence count.

/// Byte window captured on each side of the first occurrence
const SNIPPET_WINDOW: usize = 160;
/// Maximum snippet display width in characters
const SNIPPET_WIDTH: usize = 300;

/// Return the match score and a snippet around the first occurrence.
///
/// Score 0 and an empty snippet mean no match. The snippet collapses
/// internal whitespace to single spaces and is truncated to a fixed width
/// with an ellipsis marker.
pub fn match_query_snippet(content: &str, query: &str) -> (usize, String) {
    if content.is_empty() || query.is_empty() {
        return (0, String::new());
    }

    let haystack = content.to_lowercase();
    let needle = query.to_lowercase();
    let idx = match haystack.find(&needle) {
        Some(i) => i,
        None => return (0, String::new()),
    };
    let score = haystack.matches(&needle).count();

    // Window offsets come from the lowercased haystack; clamp to char
    // boundaries of the original content before slicing.
    let start = floor_char_boundary(content, idx.saturating_sub(SNIPPET_WINDOW));
    let end = floor_char_boundary(
        content,
        (idx + needle.len() + SNIPPET_WINDOW).min(content.len()),
    );
    let window = &content[start..end];

    let collapsed = window.split_whitespace().collect::<Vec<_>>().join(" ");
    (score, shorten(&collapsed, SNIPPET_WIDTH))
}

fn floor_char_boundary(s: &str, mut pos: usize) -> usize {
    pos = pos.min(s.len());
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn shorten(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let keep: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", keep.trim_end())
}
