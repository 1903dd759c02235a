//! Finding publishes for paths on disk.

use std::path::Path;

use publish_resolver_registry::Filter;
use publish_resolver_roots::PathGroup;

use crate::error::PublishError;
use crate::matcher::MatchResult;
use crate::query::{PublishQuery, QueryResults};
use crate::toolkit::Toolkit;

/// Find the publish records for a list of paths.
///
/// Works like a registry `find`, except that paths on disk take the place
/// of an entity type. Frames of a sequence resolve to the publish of the
/// whole sequence. When several publishes share a path the most recent one
/// is returned.
///
/// # Arguments
/// * `toolkit` - Project toolkit
/// * `paths` - Absolute paths to look up
/// * `filters` - Extra filters every publish must satisfy
/// * `fields` - Extra fields to return; `created_at` and `path_cache` are
///   always returned
///
/// # Returns
/// The publish of each path that has one. Paths outside the project's
/// roots or without a publish are absent.
///
/// # Errors
/// Returns [`PublishError::ConfigurationMismatch`] if a root has no storage
/// in the registry, or the error of a failed registry call.
pub fn find_publish<P: AsRef<Path>>(
    toolkit: &Toolkit,
    paths: &[P],
    filters: &[Filter],
    fields: &[String],
) -> Result<MatchResult, PublishError> {
    let group: PathGroup = toolkit.group_by_storage(paths);
    if group.is_empty() {
        return Ok(MatchResult::new());
    }

    let results: QueryResults = PublishQuery::new(toolkit.registry())
        .with_filters(filters)
        .with_fields(fields)
        .run(&group)?;

    Ok(toolkit.matcher().match_publishes(&results, &group))
}
