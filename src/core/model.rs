//! Unified data model for the packing pipeline
//!
//! Candidates are created once per qualifying file during the walk phase
//! and are immutable afterwards. Selection entries are what the budget
//! renderer committed, in priority order, with their rendered payloads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file under consideration for inclusion in the output.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the scan root, '/' separated
    pub rel_path: String,
    /// SHA-256 of the complete file content, regardless of truncation
    pub sha256: String,
    /// Decoded (and possibly masked/truncated) text buffer
    pub text: String,
    /// 64-bit SimHash fingerprint of `text`
    pub simhash: u64,
    /// Structural summary of `text`
    pub summary: String,
    /// Query occurrence count (0 when no query configured)
    pub match_score: usize,
    /// Snippet around the first query hit, empty when no match
    pub snippet: String,
}

/// One committed selection, as it appears in JSON/JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// Path relative to root
    pub path: String,
    /// Content mode the entry was rendered under
    pub mode: String,
    /// Language tag for fenced blocks
    pub lang: String,
    /// Full-content hash of the source file
    pub sha256: String,
    pub match_score: usize,
    pub snippet: String,
    /// Rendered payload: a string for summary/inline, an object for ref
    pub content: serde_json::Value,
}

/// A block destined for the Markdown "File Contents" section.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    pub rel_path: String,
    pub lang: String,
    pub body: String,
}

/// Counters accumulated across the walk and render phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_dirs: usize,
    pub total_files_in_tree: usize,
    pub total_omitted: usize,
    pub total_with_contents: usize,
    pub est_tokens_prompt: usize,
}
