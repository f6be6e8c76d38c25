//! Budget-constrained rendering
//!
//! Walks candidates in selection order and commits them into one of the
//! content modes while enforcing the global token budget. A candidate is
//! rejected outright when it alone would exceed the remaining budget;
//! the loop never aborts early on a single overflow, so a cheaper later
//! candidate can still fit.

use crate::config::{Config, LlmMode};
use crate::core::model::{Candidate, RenderedBlock, SelectionEntry};
use crate::core::simhash::hamming;
use crate::core::tokens::estimate_tokens;
use serde_json::json;

/// Fixed overhead charged per ref-mode entry, covering the framing around
/// the metadata payload
const REF_ENTRY_OVERHEAD: usize = 16;

/// Everything the renderer committed for one run.
#[derive(Debug, Default)]
pub struct RenderOutcome {
    /// Blocks for the Markdown "File Contents" section
    pub blocks: Vec<RenderedBlock>,
    /// Machine-readable entries for JSON/JSONL output
    pub entries: Vec<SelectionEntry>,
    /// Sum of committed token estimates, never above the budget
    pub est_total: usize,
}

/// Normalized distance to the closest already-rendered fingerprint.
/// The first candidate gets maximal drift by convention.
fn drift_score(simhash: u64, rendered: &[u64]) -> f64 {
    let bits = rendered
        .iter()
        .map(|prev| hamming(simhash, *prev))
        .min()
        .unwrap_or(64);
    (bits as f64 / 64.0 * 1000.0).round() / 1000.0
}

/// Select and format candidates for the configured mode under the budget.
pub fn render_blocks(cfg: &Config, candidates: &[Candidate]) -> RenderOutcome {
    let mut out = RenderOutcome::default();
    if cfg.llm_mode == LlmMode::Off {
        return out;
    }

    let mut rendered_hashes: Vec<u64> = Vec::new();
    for cand in candidates {
        let drift = drift_score(cand.simhash, &rendered_hashes);
        let committed = match cfg.llm_mode {
            LlmMode::Ref => commit_ref(cfg, cand, drift, &mut out),
            LlmMode::Summary => commit_summary(cfg, cand, drift, &mut out),
            LlmMode::Inline => commit_inline(cfg, cand, drift, &mut out),
            LlmMode::Off => unreachable!(),
        };
        if committed {
            rendered_hashes.push(cand.simhash);
        }
    }
    out
}

fn push_entry(out: &mut RenderOutcome, cfg: &Config, cand: &Candidate, lang: &str, content: serde_json::Value) {
    out.entries.push(SelectionEntry {
        path: cand.rel_path.clone(),
        mode: cfg.llm_mode.as_str().to_string(),
        lang: lang.to_string(),
        sha256: cand.sha256.clone(),
        match_score: cand.match_score,
        snippet: cand.snippet.clone(),
        content,
    });
}

fn commit_ref(cfg: &Config, cand: &Candidate, drift: f64, out: &mut RenderOutcome) -> bool {
    let mut payload = json!({
        "sha256": cand.sha256,
        "path": cand.rel_path,
        "drift": drift,
    });
    if let Some(query) = &cfg.query {
        let obj = payload.as_object_mut().expect("payload is an object");
        obj.insert("query".into(), json!(query));
        if cand.match_score > 0 {
            obj.insert("match_score".into(), json!(cand.match_score));
        }
        if !cand.snippet.is_empty() {
            obj.insert("snippet".into(), json!(cand.snippet));
        }
    }
    let meta = payload.to_string();
    let tok = estimate_tokens(&meta) + REF_ENTRY_OVERHEAD;
    if out.est_total + tok > cfg.budget_tokens {
        return false;
    }
    out.est_total += tok;
    out.blocks.push(RenderedBlock {
        rel_path: cand.rel_path.clone(),
        lang: "json".to_string(),
        body: meta,
    });
    push_entry(out, cfg, cand, "json", payload);
    true
}

fn commit_summary(cfg: &Config, cand: &Candidate, drift: f64, out: &mut RenderOutcome) -> bool {
    let tok = estimate_tokens(&cand.summary);
    if out.est_total + tok > cfg.budget_tokens {
        return false;
    }
    out.est_total += tok;

    let mut text = cand.summary.clone();
    if cfg.query.is_some() && !cand.snippet.is_empty() {
        text.push_str(&format!("\n\n<!-- query: {} -->", cand.snippet));
    }
    if cfg.explain {
        text.push_str(&format!("\n\n<!-- why: summary; drift={} -->", drift));
    }
    out.blocks.push(RenderedBlock {
        rel_path: cand.rel_path.clone(),
        lang: "markdown".to_string(),
        body: text.clone(),
    });
    push_entry(out, cfg, cand, "markdown", json!(text));
    true
}

fn commit_inline(cfg: &Config, cand: &Candidate, drift: f64, out: &mut RenderOutcome) -> bool {
    let mut lines: Vec<&str> = cand.text.lines().collect();
    if let Some(max_lines) = cfg.max_lines {
        if lines.len() > max_lines {
            lines.truncate(max_lines);
        }
    }
    let mut content = lines.join("\n");

    // Middle-out sampling when the per-file token cap is still exceeded
    if estimate_tokens(&content) > cfg.max_file_tokens {
        let head: Vec<&str> = lines.iter().take(cfg.sample_head).copied().collect();
        let tail: Vec<&str> = if cfg.sample_tail > 0 && lines.len() > cfg.sample_head {
            let start = lines.len().saturating_sub(cfg.sample_tail).max(cfg.sample_head);
            lines[start..].to_vec()
        } else {
            Vec::new()
        };
        let omitted = lines.len().saturating_sub(head.len() + tail.len());
        let marker = format!("\n<!-- [truncated middle: {} lines omitted] -->\n", omitted);
        let mut sampled: Vec<&str> = head;
        sampled.push(&marker);
        sampled.extend(tail);
        content = sampled.join("\n");
    }

    let tok = estimate_tokens(&content).min(cfg.max_file_tokens);
    if out.est_total + tok > cfg.budget_tokens {
        return false;
    }
    out.est_total += tok;

    if cfg.query.is_some() && !cand.snippet.is_empty() {
        content = format!("<!-- query: {} -->\n{}", cand.snippet, content);
    }
    if cfg.explain {
        content.push_str(&format!("\n\n<!-- why: inline; drift={}; tok={} -->", drift, tok));
    }

    let lang = cand
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "text".to_string());
    out.blocks.push(RenderedBlock {
        rel_path: cand.rel_path.clone(),
        lang: lang.clone(),
        body: content.clone(),
    });
    push_entry(out, cfg, cand, &lang, json!(content));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simhash::simhash64;
    use std::path::PathBuf;

    fn candidate(rel: &str, text: &str) -> Candidate {
        Candidate {
            path: PathBuf::from(format!("/root/{}", rel)),
            rel_path: rel.to_string(),
            sha256: format!("hash-{}", rel),
            text: text.to_string(),
            simhash: simhash64(text),
            summary: format!("- summary of {}", rel),
            match_score: 0,
            snippet: String::new(),
        }
    }

    fn cfg_with_mode(mode: LlmMode) -> Config {
        let mut cfg = Config::new("/root");
        cfg.llm_mode = mode;
        cfg
    }

    #[test]
    fn test_off_mode_renders_nothing() {
        let cfg = cfg_with_mode(LlmMode::Off);
        let out = render_blocks(&cfg, &[candidate("a.py", "content here")]);
        assert!(out.blocks.is_empty());
        assert!(out.entries.is_empty());
        assert_eq!(out.est_total, 0);
    }

    #[test]
    fn test_budget_never_exceeded() {
        let mut cfg = cfg_with_mode(LlmMode::Summary);
        cfg.budget_tokens = 20;
        let candidates: Vec<Candidate> = (0..10)
            .map(|i| candidate(&format!("f{}.py", i), &format!("def f{}(): pass {}", i, i)))
            .collect();
        let out = render_blocks(&cfg, &candidates);
        assert!(out.est_total <= 20);
        assert!(out.blocks.len() < 10);
    }

    #[test]
    fn test_overflow_skips_but_does_not_abort() {
        let mut cfg = cfg_with_mode(LlmMode::Summary);
        // First summary fits, a long one overflows, a short one still lands
        cfg.budget_tokens = 14;
        let mut big = candidate("big.py", "x");
        big.summary = "s".repeat(200);
        let out = render_blocks(
            &cfg,
            &[candidate("a.py", "alpha"), big, candidate("b.py", "beta")],
        );
        let paths: Vec<&str> = out.blocks.iter().map(|b| b.rel_path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "b.py"]);
    }

    #[test]
    fn test_budget_monotonic_under_shrinking() {
        let mut cfg = cfg_with_mode(LlmMode::Summary);
        cfg.budget_tokens = 100;
        let candidates: Vec<Candidate> = (0..6)
            .map(|i| candidate(&format!("f{}.py", i), "body"))
            .collect();
        let full: Vec<String> = render_blocks(&cfg, &candidates)
            .blocks
            .iter()
            .map(|b| b.rel_path.clone())
            .collect();
        cfg.budget_tokens = 20;
        let small: Vec<String> = render_blocks(&cfg, &candidates)
            .blocks
            .iter()
            .map(|b| b.rel_path.clone())
            .collect();
        assert!(small.len() <= full.len());
        assert_eq!(full[..small.len()], small[..]);
    }

    #[test]
    fn test_ref_mode_payload_fields() {
        let cfg = cfg_with_mode(LlmMode::Ref);
        let out = render_blocks(&cfg, &[candidate("a.py", "alpha beta gamma delta")]);
        assert_eq!(out.entries.len(), 1);
        let content = &out.entries[0].content;
        assert_eq!(content["sha256"], "hash-a.py");
        assert_eq!(content["path"], "a.py");
        // first candidate gets maximal drift
        assert_eq!(content["drift"], 1.0);
        assert_eq!(out.entries[0].lang, "json");
    }

    #[test]
    fn test_inline_truncation_marker() {
        let mut cfg = cfg_with_mode(LlmMode::Inline);
        cfg.max_lines = Some(50);
        cfg.max_file_tokens = 30;
        cfg.sample_head = 5;
        cfg.sample_tail = 3;
        cfg.budget_tokens = 1000;
        let body = (0..100)
            .map(|i| format!("print('line {}')", i))
            .collect::<Vec<_>>()
            .join("\n");
        let out = render_blocks(&cfg, &[candidate("big.py", &body)]);
        assert_eq!(out.blocks.len(), 1);
        let rendered = &out.blocks[0].body;
        // 50 kept lines minus 5 head minus 3 tail
        assert!(rendered.contains("<!-- [truncated middle: 42 lines omitted] -->"));
        assert!(rendered.starts_with("print('line 0')"));
        assert!(rendered.ends_with("print('line 49')"));
        assert!(out.est_total <= 30);
    }

    #[test]
    fn test_inline_explain_capsule() {
        let mut cfg = cfg_with_mode(LlmMode::Inline);
        cfg.explain = true;
        let out = render_blocks(&cfg, &[candidate("a.py", "short body")]);
        assert!(out.blocks[0].body.contains("<!-- why: inline; drift=1"));
    }

    #[test]
    fn test_inline_lang_from_extension() {
        let cfg = cfg_with_mode(LlmMode::Inline);
        let out = render_blocks(
            &cfg,
            &[candidate("a.py", "print(1)"), candidate("LICENSE", "text")],
        );
        assert_eq!(out.blocks[0].lang, "py");
        assert_eq!(out.blocks[1].lang, "text");
    }
}
