//! Risk evaluation
//!
//! A fixed ordered list of independent rule checks over the resolved
//! configuration and selection results. Each rule either fires once,
//! appending a finding with a fixed severity and score delta, or stays
//! quiet; rules are not mutually exclusive. Findings never raise: they are
//! surfaced purely as data for the caller to act on.

use crate::config::{Config, Preset};
use crate::core::model::{Candidate, SelectionEntry, Stats};
use crate::filter::masking::MaskingMode;
use serde::{Deserialize, Serialize};

/// Five-level severity scale, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    Risk,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warn => "warn",
            Severity::Risk => "risk",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Chili marker used in Markdown output
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Ok => "⚪️",
            Severity::Warn => "🌶",
            Severity::Risk => "🌶🌶",
            Severity::High => "🌶🌶🌶🌶",
            Severity::Critical => "🌶🌶🌶🌶🌶",
        }
    }
}

/// One risk observation. `file` is "-" and `line` 0 for global findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub suggestion: String,
    pub score: u32,
}

/// Tally of findings per severity; zero-valued levels are always present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub ok: u32,
    pub warn: u32,
    pub risk: u32,
    pub high: u32,
    pub critical: u32,
}

impl SeverityCounts {
    fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Ok => self.ok += 1,
            Severity::Warn => self.warn += 1,
            Severity::Risk => self.risk += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "ok={} warn={} risk={} high={} critical={}",
            self.ok, self.warn, self.risk, self.high, self.critical
        )
    }
}

/// Aggregated risk output: clamped score, per-severity counts, findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBundle {
    pub score: u32,
    pub counts: SeverityCounts,
    pub findings: Vec<Finding>,
}

impl RiskBundle {
    /// Marker of the highest severity with at least one finding
    pub fn level_marker(&self) -> &'static str {
        if self.counts.critical > 0 {
            Severity::Critical.marker()
        } else if self.counts.high > 0 {
            Severity::High.marker()
        } else if self.counts.risk > 0 {
            Severity::Risk.marker()
        } else if self.counts.warn > 0 {
            Severity::Warn.marker()
        } else {
            Severity::Ok.marker()
        }
    }

    /// Whether a strict caller should treat this run as failing
    pub fn has_blocking_findings(&self) -> bool {
        self.counts.high > 0 || self.counts.critical > 0
    }
}

struct Collector {
    findings: Vec<Finding>,
    score: u32,
}

impl Collector {
    fn bump(&mut self, severity: Severity, delta: u32, category: &str, message: &str, suggestion: &str) {
        self.findings.push(Finding {
            file: "-".to_string(),
            line: 0,
            severity,
            category: category.to_string(),
            message: message.to_string(),
            suggestion: suggestion.to_string(),
            score: delta,
        });
        self.score += delta;
    }
}

/// Run the rule list and aggregate the bundle.
pub fn evaluate(
    cfg: &Config,
    _stats: &Stats,
    candidates: &[Candidate],
    _selection: &[SelectionEntry],
) -> RiskBundle {
    let mut c = Collector {
        findings: Vec::new(),
        score: 0,
    };

    if cfg.masking_mode == MaskingMode::Off && cfg.preset != Preset::Raw {
        c.bump(
            Severity::High,
            20,
            "security",
            "masking is off in non-raw preset (secrets may leak)",
            "use masking mode basic or advanced",
        );
    }

    if cfg.follow_symlinks {
        c.bump(
            Severity::Risk,
            10,
            "path",
            "follow_symlinks enabled can traverse out of repo",
            "disable follow_symlinks unless required",
        );
    }

    if !cfg.emit_manifest && cfg.preset != Preset::Raw {
        c.bump(
            Severity::Warn,
            5,
            "tracking",
            "manifest disabled; provenance tracking reduced",
            "enable emit_manifest",
        );
    }

    if cfg.include_contents && cfg.max_bytes.is_some_and(|b| b > 500_000) {
        c.bump(
            Severity::Warn,
            5,
            "performance",
            "max_bytes set very high; large files may be ingested",
            "lower max_bytes or add omit globs",
        );
    }

    if cfg.query.is_some() && !candidates.iter().any(|cand| cand.match_score > 0) {
        c.bump(
            Severity::Warn,
            5,
            "relevance",
            "query provided but no files matched",
            "adjust the query or the include globs",
        );
    }

    let mut counts = SeverityCounts::default();
    for finding in &c.findings {
        counts.bump(finding.severity);
    }

    RiskBundle {
        score: c.score.min(100),
        counts,
        findings: c.findings,
    }
}
