//! Storage roots and path grouping for publish resolution.
//!
//! This crate turns filesystem paths into registry lookup keys:
//!
//! - **Storage Roots** - Named absolute prefixes configured per project
//! - **Root Resolution** - Map a path to `(root name, path cache)`
//! - **Path Grouping** - Batch paths by storage and path cache
//!
//! # Path Cache
//!
//! A path cache is the slash-normalized path relative to the *parent* of
//! its storage root, so it keeps the project directory name:
//! `/studio/proj/scenes/a.ma` under root `/studio/proj` becomes
//! `proj/scenes/a.ma`.

mod error;
mod grouping;
mod resolver;
mod types;

pub use error::RootConfigError;
pub use grouping::{group_by_storage, PathGroup, PathGroupBuilder};
pub use resolver::{ResolvedPath, RootResolver, RootTieBreak};
pub use types::{OsFamily, RootConfiguration, StorageRoot};
