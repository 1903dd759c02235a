//! Shared types and utilities for publish path resolution.
//!
//! This crate provides common functionality used across all publish-resolver crates:
//! - Slash normalization and case-insensitive root prefix matching
//! - Pipeline configuration locations
//! - Shared constants and error types

pub mod constants;
pub mod error;
pub mod path_utils;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::PathError;
pub use path_utils::{
    config_core_dir, file_name, normalize_separators, path_cache_offset, read_config_file,
    strip_root_ignore_case, trim_trailing_separators,
};
