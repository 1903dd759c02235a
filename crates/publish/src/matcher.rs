//! Reconciling publish records onto the paths that asked for them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use publish_resolver_registry::Record;
use publish_resolver_roots::PathGroup;

use crate::query::QueryResults;

/// The publish record matched to each original path.
///
/// Paths without a matching publish are absent.
pub type MatchResult = BTreeMap<PathBuf, Record>;

/// Policy for publishes with equal creation times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// The record processed last wins.
    #[default]
    LastProcessed,
    /// The record processed first wins.
    FirstProcessed,
}

/// Picks the most recent publish for every path.
///
/// Records are processed storage by storage in sorted storage order and, within
/// a storage, in the order the registry returned them. A record replaces the
/// current match of a path when it was created strictly later; equal creation
/// times are settled by the [`TieBreak`] policy. Records without a readable
/// `created_at` lose against any dated record.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishMatcher {
    tie_break: TieBreak,
}

impl PublishMatcher {
    /// Create a matcher with the default tie-break.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Map original paths to their most recent publish.
    ///
    /// # Arguments
    /// * `results` - Publish records per storage
    /// * `group` - The grouping the records were queried for
    pub fn match_publishes(&self, results: &QueryResults, group: &PathGroup) -> MatchResult {
        let mut matches: MatchResult = MatchResult::new();

        for (storage, records) in results {
            for record in records {
                let Some(path_cache) = record.path_cache() else {
                    log::warn!(
                        "Publish {} has no path cache, ignoring",
                        record.id()
                    );
                    continue;
                };

                for path in group.paths_for(storage, path_cache) {
                    let replace: bool = match matches.get(path) {
                        Some(current) => self.replaces(record, current),
                        None => true,
                    };
                    if replace {
                        matches.insert(path.clone(), record.clone());
                    }
                }
            }
        }

        matches
    }

    fn replaces(&self, candidate: &Record, current: &Record) -> bool {
        let candidate_time: Option<DateTime<Utc>> = candidate.created_at();
        let current_time: Option<DateTime<Utc>> = current.created_at();
        if candidate_time != current_time {
            return candidate_time > current_time;
        }
        self.tie_break == TieBreak::LastProcessed
    }
}
