//! Markdown document assembly
//!
//! Produces the human-readable output: header metadata, fenced directory
//! tree, per-file content sections and the optional summary table. Content
//! fences always use more consecutive backticks than the longest run found
//! inside the block, so file content can never break out of its fence.

use crate::config::{Config, LlmMode};
use crate::core::model::{RenderedBlock, Stats};
use crate::risk::RiskBundle;
use chrono::Local;

/// Fence sized to beat the longest backtick run in `text`, minimum 3.
fn fence_for(text: &str) -> String {
    let mut longest = 0usize;
    let mut current = 0usize;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Assemble the full Markdown document.
pub fn to_markdown(
    cfg: &Config,
    tree_lines: &[String],
    blocks: &[RenderedBlock],
    stats: &Stats,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push("# Project Blueprint\n".to_string());
    parts.push(format!("- Root: `{}`  ", cfg.root.display()));
    if !cfg.no_timestamp {
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
        parts.push(format!("- Generated: `{}`  ", ts));
    }
    parts.push(format!("- Preset: `{}`  ", cfg.preset.as_str()));
    parts.push(format!("- LLM mode: `{}`  ", cfg.llm_mode.as_str()));
    parts.push(format!(
        "- Estimated tokens (prompt): `{}`  ",
        stats.est_tokens_prompt
    ));
    parts.push(String::new());
    parts.push("## Directory Tree\n".to_string());
    // Tree lines carry no file content, a plain fence is safe
    parts.push(format!("```\n{}\n```\n", tree_lines.join("\n")));

    if cfg.llm_mode != LlmMode::Off && !blocks.is_empty() {
        parts.push("## File Contents\n".to_string());
        for block in blocks {
            parts.push(format!("### File: `{}`\n", block.rel_path));
            let fence = fence_for(&block.body);
            parts.push(format!(
                "{}{}\n{}\n{}\n",
                fence, block.lang, block.body, fence
            ));
        }
    }

    if cfg.add_stats {
        parts.push("## Summary\n".to_string());
        parts.push("| metric | value |\n|---|---:|".to_string());
        parts.push(format!("| dirs | {} |", stats.total_dirs));
        parts.push(format!("| files in tree | {} |", stats.total_files_in_tree));
        parts.push(format!("| selected files | {} |", stats.total_with_contents));
        parts.push(format!("| omitted | {} |", stats.total_omitted));
        parts.push(format!(
            "| est tokens (prompt) | {} |\n",
            stats.est_tokens_prompt
        ));
    }

    parts.join("\n")
}

/// Append the risk section to an already-rendered document.
pub fn append_risk_section(mut document: String, bundle: &RiskBundle) -> String {
    document.push_str("\n## Risk Review\n");
    document.push_str(&format!(
        "- Risk Level: {}  score={}/100\n",
        bundle.level_marker(),
        bundle.score
    ));
    document.push_str(&format!("- Counts: {}\n", bundle.counts.summary_line()));
    if !bundle.findings.is_empty() {
        document.push('\n');
        document.push_str("| file | line | severity | category | message | suggestion |\n");
        document.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for f in &bundle.findings {
            document.push_str(&format!(
                "| {} | {} | {} {} | {} | {} | {} |\n",
                f.file,
                f.line,
                f.severity.marker(),
                f.severity.as_str(),
                f.category,
                f.message,
                f.suggestion
            ));
        }
    }
    document
}
