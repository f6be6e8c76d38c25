//! Candidate selection
//!
//! Turns the walker's file list into the ordered candidate set: extension
//! and omit/include filtering, symlink boundary enforcement, streaming
//! fingerprinting, masking, query matching, summarization, and SimHash
//! near-duplicate rejection.
//!
//! Dedup is order-sensitive: acceptance depends on visitation order, which
//! is the sorted walk order. The optional parallel path only fans out the
//! per-file work and returns results in walk order before the dedup pass,
//! so selection outcomes are identical with or without it.

use crate::config::{Config, MAX_CANDIDATE_BYTES};
use crate::core::hash::{digest_file, sha256_bytes};
use crate::core::model::Candidate;
use crate::core::paths::{is_within_root, make_relative};
use crate::core::simhash::{is_near_duplicate, simhash64};
use crate::filter::globs::PathFilters;
use crate::filter::masking::{apply_masking, MaskingMode};
use crate::filter::search::match_query_snippet;
use crate::summary::summarize;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Summary line budget per candidate
const SUMMARY_MAX_LINES: usize = 40;

/// Build the candidate list from walk-ordered `files`.
///
/// Files that fail a filter or cannot be read are dropped silently; the
/// run continues. With a query configured, only candidates with a nonzero
/// match score survive, reordered by descending score (stable for ties).
pub fn build_candidates(cfg: &Config, files: &[PathBuf], filters: &PathFilters) -> Vec<Candidate> {
    let prepared = prepare_all(cfg, files, filters);

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut seen: Vec<u64> = Vec::new();
    for cand in prepared {
        if cfg.dedup_bits > 0 && is_near_duplicate(cand.simhash, &seen, cfg.dedup_bits) {
            debug!(path = %cand.rel_path, "near-duplicate rejected");
            continue;
        }
        seen.push(cand.simhash);
        candidates.push(cand);
    }

    if let Some(query) = &cfg.query {
        candidates.retain(|c| c.match_score > 0);
        // stable: ties keep prior relative order
        candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        debug!(query = %query, survivors = candidates.len(), "query filter applied");
    }

    candidates
}

#[cfg(not(feature = "parallel"))]
fn prepare_all(cfg: &Config, files: &[PathBuf], filters: &PathFilters) -> Vec<Candidate> {
    files
        .iter()
        .filter_map(|path| prepare(cfg, path, filters))
        .collect()
}

#[cfg(feature = "parallel")]
fn prepare_all(cfg: &Config, files: &[PathBuf], filters: &PathFilters) -> Vec<Candidate> {
    // par_iter + collect preserves input order, keeping dedup deterministic
    files
        .par_iter()
        .filter_map(|path| prepare(cfg, path, filters))
        .collect()
}

/// Per-file pipeline stage: filters, digest, mask, query, summary.
fn prepare(cfg: &Config, path: &Path, filters: &PathFilters) -> Option<Candidate> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !cfg.ext_allowed(&ext) {
        return None;
    }

    let rel_path = make_relative(path, &cfg.root)?;
    if filters.is_omitted(&rel_path) || !filters.is_included(&rel_path) {
        return None;
    }

    if path.is_symlink() {
        if !cfg.follow_symlinks {
            return None;
        }
        // Security boundary: symlinks resolving outside the root are
        // dropped without a warning
        if !is_within_root(path, &cfg.root) {
            debug!(path = %rel_path, "symlink escapes root, dropped");
            return None;
        }
    }

    let (sha256, text) = read_candidate_text(cfg, path)?;

    let text = if cfg.masking_mode != MaskingMode::Off || !cfg.custom_mask_patterns.is_empty() {
        apply_masking(&text, cfg.masking_mode, &cfg.custom_mask_patterns)
    } else {
        text
    };

    let (match_score, snippet) = match &cfg.query {
        Some(query) => match_query_snippet(&text, query),
        None => (0, String::new()),
    };

    let simhash = simhash64(&text);
    let summary = summarize(path, &text, SUMMARY_MAX_LINES);

    Some(Candidate {
        path: path.to_path_buf(),
        rel_path,
        sha256,
        text,
        simhash,
        summary,
        match_score,
        snippet,
    })
}

/// Stream the file, or substitute the oversize placeholder.
fn read_candidate_text(cfg: &Config, path: &Path) -> Option<(String, String)> {
    let size = std::fs::metadata(path).ok()?.len();
    if size > MAX_CANDIDATE_BYTES {
        let placeholder = format!("[file too large: {} bytes, content omitted]", size);
        let sha256 = sha256_bytes(placeholder.as_bytes());
        return Some((sha256, placeholder));
    }
    match digest_file(path, cfg.max_bytes) {
        Ok(digest) => {
            let text = String::from_utf8_lossy(&digest.prefix).into_owned();
            Some((digest.sha256, text))
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "unreadable file dropped");
            None
        }
    }
}
