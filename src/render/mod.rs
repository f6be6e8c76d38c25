//! Rendering layer
//!
//! - Budget-constrained selection and per-mode payload formatting
//! - Markdown document assembly
//! - Side manifest construction and writing

pub mod budget;
pub mod manifest;
pub mod markdown;
