//! Publish resolution and registration.
//!
//! This crate ties the path, template and registry crates together:
//! - `find_publish()` - Map paths on disk to their publish records
//! - `register_publish()` - Create a publish with thumbnails and dependencies
//! - `PublishQuery` - One registry query per storage
//! - `PublishMatcher` - Most-recent-wins reconciliation of query results
//! - `DependencyLinker` - Dependency edges between publishes
//!
//! A [`Toolkit`] bundles the registry client with a project's storage roots
//! and sequence templates; every operation takes one.

pub mod context;
pub mod dependencies;
pub mod error;
pub mod find;
pub mod matcher;
pub mod query;
pub mod register;
pub mod toolkit;

pub use context::Context;
pub use dependencies::DependencyLinker;
pub use error::PublishError;
pub use find::find_publish;
pub use matcher::{MatchResult, PublishMatcher, TieBreak};
pub use query::{PublishQuery, QueryResults};
pub use register::{register_publish, PublishRegistrar, RegisterOptions};
pub use toolkit::Toolkit;
