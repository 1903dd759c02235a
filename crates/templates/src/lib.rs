//! Path templates and sequence abstraction.
//!
//! This crate provides the template side of path resolution:
//! - `Template` / `TemplateMatcher` - The contract a template engine fulfils
//! - `PatternTemplate` / `TemplateSet` - A regex-backed template engine
//! - `SequenceAbstractor` - Collapses per-frame paths to one canonical path
//!
//! # Sequence Abstraction
//!
//! Every frame of a rendered sequence is its own file on disk, but the
//! registry only knows the sequence once. Fields flagged as *abstract* (frame
//! numbers, eye, ...) are replaced by their default value so that all frames
//! resolve to the same path.

pub mod error;
pub mod pattern;
pub mod sequence;
pub mod template;

pub use error::TemplateError;
pub use pattern::{PatternTemplate, TemplateField, TemplateSet};
pub use sequence::SequenceAbstractor;
pub use template::{Template, TemplateMatcher};
