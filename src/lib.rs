//! dirpack - Pack a directory tree into a single LLM-ready context document
//!
//! dirpack provides:
//! - Recursive tree walking with glob and gitignore filtering
//! - Secret masking with built-in and custom regex rules
//! - Near-duplicate elimination via 64-bit SimHash fingerprints
//! - Query-driven file ranking with snippet extraction
//! - Token-budgeted rendering (ref/summary/inline) to md/json/jsonl
//! - A side manifest with content hashes and a risk review
//!
//! The entry point is [`Report::generate`]; [`pack`] is the one-call
//! convenience that also writes the manifest.

pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod render;
pub mod report;
pub mod risk;
pub mod selector;
pub mod summary;
pub mod walker;

pub use config::{Capabilities, Config, LlmMode, OutputFormat, Preset};
pub use crate::core::model::{Candidate, SelectionEntry, Stats};
pub use crate::core::tokens::estimate_tokens;
pub use error::{Error, Result};
pub use filter::masking::MaskingMode;
pub use report::{pack, Report};
pub use risk::{RiskBundle, Severity};
