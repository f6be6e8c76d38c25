//! Generation pipeline
//!
//! One [`Report::generate`] call owns the whole pass: resolve and validate
//! the configuration, walk the tree, build candidates, render under the
//! token budget, evaluate risk. The resulting report is immutable and can
//! be serialized to any of the output formats.

use crate::config::{Capabilities, Config, OutputFormat};
use crate::core::model::{RenderedBlock, SelectionEntry, Stats};
use crate::error::Result;
use crate::filter::globs::{build_gitignore, PathFilters};
use crate::render::budget::render_blocks;
use crate::render::manifest::{build_manifest, write_manifest};
use crate::render::markdown::{append_risk_section, to_markdown};
use crate::risk::{evaluate, RiskBundle};
use crate::selector::build_candidates;
use crate::walker::walk;
use serde_json::json;
use std::path::PathBuf;

/// The outcome of one generation pass.
#[derive(Debug)]
pub struct Report {
    cfg: Config,
    pub stats: Stats,
    pub tree_lines: Vec<String>,
    pub blocks: Vec<RenderedBlock>,
    pub entries: Vec<SelectionEntry>,
    pub risk: Option<RiskBundle>,
}

impl Report {
    /// Generate with the default (fully enabled) capability set.
    pub fn generate(cfg: &Config) -> Result<Report> {
        Self::generate_with(cfg, &Capabilities::default())
    }

    /// Resolve `cfg` against `caps`, then run the pipeline.
    pub fn generate_with(cfg: &Config, caps: &Capabilities) -> Result<Report> {
        let cfg = cfg.clone().resolve(caps);
        cfg.validate()?;

        let gitignore = if cfg.respect_gitignore {
            build_gitignore(&cfg.root)
        } else {
            None
        };
        let filters = PathFilters::new(
            &cfg.include_globs,
            &cfg.exclude_globs,
            &cfg.omit_globs,
            gitignore,
        );

        let mut stats = Stats::default();
        let outcome = walk(&cfg.root, &filters, cfg.follow_symlinks, &mut stats);
        let candidates = build_candidates(&cfg, &outcome.files, &filters);

        let rendered = if cfg.include_contents {
            render_blocks(&cfg, &candidates)
        } else {
            Default::default()
        };

        stats.total_files_in_tree = outcome.files.len();
        stats.total_with_contents = rendered.blocks.len();
        stats.total_omitted = outcome.files.len().saturating_sub(rendered.blocks.len());
        stats.est_tokens_prompt = rendered.est_total;

        let risk = cfg
            .risk_report
            .then(|| evaluate(&cfg, &stats, &candidates, &rendered.entries));

        Ok(Report {
            cfg,
            stats,
            tree_lines: outcome.tree_lines,
            blocks: rendered.blocks,
            entries: rendered.entries,
            risk,
        })
    }

    /// The resolved configuration the report was generated under
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Render in the format the configuration selects.
    pub fn render(&self) -> Result<String> {
        self.render_as(self.cfg.output_format)
    }

    /// Render in an explicit format.
    pub fn render_as(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Json => self.to_json(),
            OutputFormat::Jsonl => self.to_jsonl(),
        }
    }

    /// Human-readable Markdown document.
    pub fn to_markdown(&self) -> String {
        let document = to_markdown(&self.cfg, &self.tree_lines, &self.blocks, &self.stats);
        match &self.risk {
            Some(bundle) => append_risk_section(document, bundle),
            None => document,
        }
    }

    /// Single JSON object with stats, file entries and the risk bundle.
    pub fn to_json(&self) -> Result<String> {
        let payload = json!({
            "root": self.cfg.root.display().to_string(),
            "preset": self.cfg.preset.as_str(),
            "llm_mode": self.cfg.llm_mode.as_str(),
            "stats": self.stats,
            "files": self.entries,
            "spicy": self.risk,
        });
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// One JSON object per line; the risk bundle, when present, trails
    /// under a `spicy` key.
    pub fn to_jsonl(&self) -> Result<String> {
        let mut lines: Vec<String> = Vec::with_capacity(self.entries.len() + 1);
        for entry in &self.entries {
            lines.push(serde_json::to_string(entry)?);
        }
        if let Some(bundle) = &self.risk {
            lines.push(serde_json::to_string(&json!({ "spicy": bundle }))?);
        }
        Ok(lines.join("\n"))
    }

    /// Assemble the manifest document.
    pub fn manifest(&self) -> serde_json::Value {
        build_manifest(
            &self.stats,
            &self.entries,
            self.risk.as_ref(),
            self.cfg.masking_mode,
        )
    }

    /// Write the manifest next to the configured output path, when
    /// manifest emission is enabled. Returns the written path.
    pub fn write_manifest(&self) -> Result<Option<PathBuf>> {
        if !self.cfg.emit_manifest {
            return Ok(None);
        }
        let path = self.cfg.manifest_path();
        write_manifest(&self.manifest(), &path)?;
        Ok(Some(path))
    }
}

/// Generate, write the manifest when enabled, and render in the
/// configured output format.
pub fn pack(cfg: &Config) -> Result<String> {
    let report = Report::generate(cfg)?;
    report.write_manifest()?;
    report.render()
}
