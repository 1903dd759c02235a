//! Path cache resolution against storage roots.

use std::cmp::Reverse;

use publish_resolver_common::{
    normalize_separators, path_cache_offset, storage_name_for_root, strip_root_ignore_case,
    trim_trailing_separators,
};

use crate::types::{RootConfiguration, StorageRoot};

/// Policy for choosing between roots that all contain a path.
///
/// Roots overlap when one is a prefix of another, e.g. `/studio/proj` and
/// `/studio/proj/renders`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootTieBreak {
    /// The most specific (longest) root wins; equal lengths fall back to
    /// configuration order.
    #[default]
    LongestMatch,
    /// The first matching root in configuration order wins.
    FirstConfigured,
}

/// A path resolved to its storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Name of the matching root (e.g. `primary`).
    pub root_name: String,
    /// Storage-relative, slash-normalized path cache.
    pub path_cache: String,
}

impl ResolvedPath {
    /// Storage name used in registry queries (`primary` is known as `Tank`).
    pub fn storage_name(&self) -> &str {
        storage_name_for_root(&self.root_name)
    }
}

/// Root with its path pre-normalized for matching.
#[derive(Debug, Clone)]
struct NormalizedRoot {
    name: String,
    path: String,
}

/// Maps absolute paths to `(root name, path cache)` pairs.
#[derive(Debug, Clone)]
pub struct RootResolver {
    roots: Vec<NormalizedRoot>,
    tie_break: RootTieBreak,
}

impl RootResolver {
    /// Create a resolver for a project's roots with the default tie-break.
    ///
    /// # Arguments
    /// * `config` - The project's root configuration
    pub fn new(config: &RootConfiguration) -> Self {
        Self::from_roots(&config.roots)
    }

    /// Create a resolver from explicit roots.
    ///
    /// # Arguments
    /// * `roots` - Storage roots, in configuration order
    pub fn from_roots(roots: &[StorageRoot]) -> Self {
        let roots: Vec<NormalizedRoot> = roots
            .iter()
            .map(|root| {
                let normalized: String = normalize_separators(&root.absolute_path);
                NormalizedRoot {
                    name: root.name.clone(),
                    path: trim_trailing_separators(&normalized).to_string(),
                }
            })
            .filter(|root| !root.path.is_empty())
            .collect();

        Self {
            roots,
            tie_break: RootTieBreak::default(),
        }
    }

    /// Set the policy for overlapping roots.
    ///
    /// # Arguments
    /// * `tie_break` - Policy to apply
    pub fn with_tie_break(mut self, tie_break: RootTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Resolve a path to its root and path cache.
    ///
    /// Separators are normalized to `/` and the root prefix is compared
    /// ASCII case-insensitively. The returned path cache keeps the input's
    /// case.
    ///
    /// # Arguments
    /// * `path` - Absolute path in either separator style
    ///
    /// # Returns
    /// The resolved root and path cache, or `None` if no root contains `path`.
    pub fn resolve(&self, path: &str) -> Option<ResolvedPath> {
        let normalized: String = normalize_separators(path);

        let mut candidates = self
            .roots
            .iter()
            .enumerate()
            .filter(|(_, root)| strip_root_ignore_case(&normalized, &root.path).is_some());

        let (_, root): (usize, &NormalizedRoot) = match self.tie_break {
            RootTieBreak::FirstConfigured => candidates.next()?,
            RootTieBreak::LongestMatch => {
                candidates.min_by_key(|(index, root)| (Reverse(root.path.len()), *index))?
            }
        };

        Some(ResolvedPath {
            root_name: root.name.clone(),
            path_cache: normalized[path_cache_offset(&root.path)..].to_string(),
        })
    }
}
