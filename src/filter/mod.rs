//! Filtering layer applied between the walk and the renderer
//!
//! - Glob pattern sets and gitignore merging
//! - Secret masking
//! - Query matching and snippet extraction

pub mod globs;
pub mod masking;
pub mod search;
