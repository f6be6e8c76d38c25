//! Core module - fundamental data structures and utilities
//!
//! This module provides:
//! - The pipeline data model (Candidate, SelectionEntry, Stats)
//! - Streaming content hashing
//! - SimHash near-duplicate fingerprinting
//! - Path normalization utilities
//! - Token estimation for LLM context budgeting

pub mod hash;
pub mod model;
pub mod paths;
pub mod simhash;
pub mod tokens;
