//! Run configuration
//!
//! A [`Config`] is fully resolved (defaults applied, preset overrides
//! applied, capabilities consulted) before any file is read, and is
//! immutable for the rest of the run.

use crate::error::{Error, Result};
use crate::filter::masking::MaskingMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::warn;

/// Exclude globs applied by default. Written with `**/` prefixes because
/// the matcher takes patterns literally: a bare name would only match at
/// the root.
pub const DEFAULT_EXCLUDE_GLOBS: &[&str] = &[
    "**/.git",
    "**/__pycache__",
    "**/node_modules",
    "**/.venv",
    "**/venv",
    "**/.pytest_cache",
    "**/target",
    "**/build",
    "**/dist",
    "**/*.pyc",
    "**/.DS_Store",
    "**/.env",
    "**/.env.*",
    "**/*.env",
    "**/*.pem",
    "**/*.key",
    "**/*.p12",
    "**/*.pfx",
    "**/*.cer",
    "**/*.crt",
];

/// Hard per-file size ceiling in bytes. Files above this are replaced by a
/// placeholder candidate regardless of the configurable byte cap, to bound
/// worst-case memory.
pub const MAX_CANDIDATE_BYTES: u64 = 10_000_000;

/// Content fidelity mode for the budget renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    /// No content emitted
    Off,
    /// Hash + path + drift metadata only
    Ref,
    /// Structural summary text
    #[default]
    Summary,
    /// Raw (possibly truncated) file text
    Inline,
}

impl LlmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMode::Off => "off",
            LlmMode::Ref => "ref",
            LlmMode::Summary => "summary",
            LlmMode::Inline => "inline",
        }
    }
}

impl std::str::FromStr for LlmMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(LlmMode::Off),
            "ref" => Ok(LlmMode::Ref),
            "summary" => Ok(LlmMode::Summary),
            "inline" => Ok(LlmMode::Inline),
            _ => Err(format!("Unknown llm mode: {}", s)),
        }
    }
}

/// Named preset adjusting multiple defaults atomically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Summary-mode default, everything else untouched
    #[default]
    Pro,
    /// Inline content, no dedup, no extension filter, no manifest
    Raw,
    /// Tree + manifest only, content off
    Fast,
    /// Ref mode with a capped budget, for agent consumption
    Ai,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Pro => "pro",
            Preset::Raw => "raw",
            Preset::Fast => "fast",
            Preset::Ai => "ai",
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pro" => Ok(Preset::Pro),
            "raw" => Ok(Preset::Raw),
            "fast" => Ok(Preset::Fast),
            "ai" => Ok(Preset::Ai),
            _ => Err(format!("Unknown preset: {}", s)),
        }
    }
}

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "md")]
    Markdown,
    Json,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Explicit capability set consulted during configuration resolution.
///
/// Replaces any notion of process-global feature gating: callers decide
/// once, at startup, what the run may use. The default enables everything.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Permit the advanced masking rule tier
    pub advanced_masking: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            advanced_masking: true,
        }
    }
}

/// Immutable-per-run configuration record.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory to pack
    pub root: PathBuf,
    /// Output document path; the manifest is written as a sibling
    pub output: PathBuf,
    /// Include patterns: when non-empty, only matching files get content
    pub include_globs: Vec<String>,
    /// Exclude patterns: matching entries are pruned from traversal
    pub exclude_globs: Vec<String>,
    /// Omit patterns: matching files stay in the tree without content
    pub omit_globs: Vec<String>,
    /// Merge `.gitignore` rules into the exclude predicate
    pub respect_gitignore: bool,
    /// Follow symbolic links (directories and files)
    pub follow_symlinks: bool,
    /// Byte cap on retained content per file; `None` keeps everything
    pub max_bytes: Option<usize>,
    /// Line cap applied before inline rendering
    pub max_lines: Option<usize>,
    /// Master switch for content extraction
    pub include_contents: bool,
    /// Extension allow-list (lowercase, no dot); `None` allows all
    pub only_ext: Option<BTreeSet<String>>,
    /// Append the summary table to Markdown output
    pub add_stats: bool,
    /// Content fidelity mode
    pub llm_mode: LlmMode,
    /// Global token budget for the selection
    pub budget_tokens: usize,
    /// Per-file token cap in inline mode
    pub max_file_tokens: usize,
    /// Near-duplicate Hamming threshold in bits; 0 disables dedup
    pub dedup_bits: u32,
    /// Head lines kept verbatim when sampling truncated inline content
    pub sample_head: usize,
    /// Tail lines kept verbatim when sampling truncated inline content
    pub sample_tail: usize,
    /// Write the side manifest
    pub emit_manifest: bool,
    /// Active preset
    pub preset: Preset,
    /// Append selection-rationale capsule comments to rendered blocks
    pub explain: bool,
    /// Omit the generation timestamp for reproducible output
    pub no_timestamp: bool,
    /// Secret masking mode
    pub masking_mode: MaskingMode,
    /// Custom mask regex patterns, applied before the built-in rules
    pub custom_mask_patterns: Vec<String>,
    /// Optional search query used to filter and prioritize candidates
    pub query: Option<String>,
    /// Output format selector
    pub output_format: OutputFormat,
    /// Produce the risk bundle
    pub risk_report: bool,
}

impl Config {
    /// A configuration with the stock defaults for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: PathBuf::from("PROJECT_BLUEPRINT.md"),
            include_globs: Vec::new(),
            exclude_globs: DEFAULT_EXCLUDE_GLOBS.iter().map(|s| s.to_string()).collect(),
            omit_globs: Vec::new(),
            respect_gitignore: false,
            follow_symlinks: false,
            max_bytes: Some(200_000),
            max_lines: Some(2000),
            include_contents: true,
            only_ext: None,
            add_stats: true,
            llm_mode: LlmMode::Summary,
            budget_tokens: 6000,
            max_file_tokens: 1200,
            dedup_bits: 16,
            sample_head: 120,
            sample_tail: 40,
            emit_manifest: true,
            preset: Preset::Pro,
            explain: false,
            no_timestamp: false,
            masking_mode: MaskingMode::Basic,
            custom_mask_patterns: Vec::new(),
            query: None,
            output_format: OutputFormat::Markdown,
            risk_report: false,
        }
    }

    /// Apply preset overrides and capability downgrades, producing the
    /// final configuration for the run.
    pub fn resolve(mut self, caps: &Capabilities) -> Self {
        match self.preset {
            Preset::Raw => {
                self.llm_mode = LlmMode::Inline;
                self.dedup_bits = 0;
                self.only_ext = None;
                self.emit_manifest = false;
            }
            Preset::Pro => {}
            Preset::Fast => {
                self.llm_mode = LlmMode::Off;
                self.dedup_bits = 16;
                self.emit_manifest = true;
                self.include_contents = false;
                self.output_format = OutputFormat::Markdown;
            }
            Preset::Ai => {
                self.llm_mode = LlmMode::Ref;
                self.budget_tokens = self.budget_tokens.min(4000);
            }
        }
        if self.masking_mode == MaskingMode::Advanced && !caps.advanced_masking {
            warn!("advanced masking not available, downgrading to basic");
            self.masking_mode = MaskingMode::Basic;
        }
        self
    }

    /// Validate the root path. Fatal: no output is produced on failure.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(Error::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(Error::RootNotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Sibling path the manifest is written to
    pub fn manifest_path(&self) -> PathBuf {
        self.output.with_extension("manifest.json")
    }

    /// Whether `ext` (lowercase, no dot) passes the extension allow-list
    pub fn ext_allowed(&self, ext: &str) -> bool {
        match &self.only_ext {
            None => true,
            Some(allowed) => allowed.contains(ext),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_preset_overrides() {
        let mut cfg = Config::new(".");
        cfg.preset = Preset::Raw;
        let cfg = cfg.resolve(&Capabilities::default());
        assert_eq!(cfg.llm_mode, LlmMode::Inline);
        assert_eq!(cfg.dedup_bits, 0);
        assert!(cfg.only_ext.is_none());
        assert!(!cfg.emit_manifest);
    }

    #[test]
    fn test_fast_preset_disables_content() {
        let mut cfg = Config::new(".");
        cfg.preset = Preset::Fast;
        let cfg = cfg.resolve(&Capabilities::default());
        assert_eq!(cfg.llm_mode, LlmMode::Off);
        assert!(!cfg.include_contents);
        assert!(cfg.emit_manifest);
    }

    #[test]
    fn test_ai_preset_caps_budget() {
        let mut cfg = Config::new(".");
        cfg.preset = Preset::Ai;
        cfg.budget_tokens = 9000;
        let cfg = cfg.resolve(&Capabilities::default());
        assert_eq!(cfg.llm_mode, LlmMode::Ref);
        assert_eq!(cfg.budget_tokens, 4000);
    }

    #[test]
    fn test_capability_downgrades_advanced_masking() {
        let mut cfg = Config::new(".");
        cfg.masking_mode = MaskingMode::Advanced;
        let caps = Capabilities {
            advanced_masking: false,
        };
        assert_eq!(cfg.clone().resolve(&caps).masking_mode, MaskingMode::Basic);
        assert_eq!(
            cfg.resolve(&Capabilities::default()).masking_mode,
            MaskingMode::Advanced
        );
    }

    #[test]
    fn test_validate_missing_root() {
        let cfg = Config::new("/definitely/not/a/real/path");
        assert!(matches!(
            cfg.validate(),
            Err(crate::error::Error::RootNotFound(_))
        ));
    }

    #[test]
    fn test_manifest_path_is_sibling() {
        let mut cfg = Config::new(".");
        cfg.output = PathBuf::from("/tmp/OUT.md");
        assert_eq!(cfg.manifest_path(), PathBuf::from("/tmp/OUT.manifest.json"));
    }

    #[test]
    fn test_mode_round_trip() {
        assert_eq!("inline".parse::<LlmMode>().unwrap(), LlmMode::Inline);
        assert_eq!("raw".parse::<Preset>().unwrap(), Preset::Raw);
        assert_eq!(
            "jsonl".parse::<OutputFormat>().unwrap(),
            OutputFormat::Jsonl
        );
        assert!("bogus".parse::<LlmMode>().is_err());
    }
}
