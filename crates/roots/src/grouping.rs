//! Path grouping by storage and path cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use publish_resolver_templates::SequenceAbstractor;

use crate::resolver::{ResolvedPath, RootResolver};

/// Original paths grouped by storage name, then by path cache.
///
/// Several original paths share one path cache when they are frames of the
/// same sequence (or literal duplicates); all of them are kept, in insertion
/// order. Storages and path caches iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathGroup {
    storages: BTreeMap<String, BTreeMap<String, Vec<PathBuf>>>,
}

impl PathGroup {
    /// Check if no path was grouped.
    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }

    /// Number of distinct storages.
    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    /// Total number of original paths across all buckets.
    pub fn path_count(&self) -> usize {
        self.storages
            .values()
            .flat_map(|caches| caches.values())
            .map(Vec::len)
            .sum()
    }

    /// Storage names, sorted.
    pub fn storage_names(&self) -> impl Iterator<Item = &str> {
        self.storages.keys().map(String::as_str)
    }

    /// Path caches and their original paths for one storage.
    ///
    /// # Arguments
    /// * `storage` - Storage name (`Tank` for the primary root)
    pub fn path_caches(&self, storage: &str) -> Option<&BTreeMap<String, Vec<PathBuf>>> {
        self.storages.get(storage)
    }

    /// Original paths sharing a path cache.
    ///
    /// # Arguments
    /// * `storage` - Storage name
    /// * `path_cache` - Path cache key
    ///
    /// # Returns
    /// The original paths, or an empty slice if the bucket does not exist.
    pub fn paths_for(&self, storage: &str, path_cache: &str) -> &[PathBuf] {
        self.storages
            .get(storage)
            .and_then(|caches| caches.get(path_cache))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over `(storage, path caches)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<PathBuf>>)> {
        self.storages
            .iter()
            .map(|(storage, caches)| (storage.as_str(), caches))
    }

    fn insert(&mut self, storage: &str, path_cache: String, original: PathBuf) {
        self.storages
            .entry(storage.to_string())
            .or_default()
            .entry(path_cache)
            .or_default()
            .push(original);
    }
}

/// Accumulates paths into a [`PathGroup`].
///
/// Each path is abstracted (sequence frames collapse to one path), resolved
/// against the storage roots and filed under its storage and path cache.
/// Paths outside every root are skipped.
#[derive(Debug)]
pub struct PathGroupBuilder<'a> {
    resolver: &'a RootResolver,
    abstractor: &'a SequenceAbstractor,
    group: PathGroup,
    skipped: Vec<PathBuf>,
}

impl<'a> PathGroupBuilder<'a> {
    /// Start an empty grouping.
    ///
    /// # Arguments
    /// * `resolver` - Root resolver for the project
    /// * `abstractor` - Sequence abstractor applied before resolution
    pub fn new(resolver: &'a RootResolver, abstractor: &'a SequenceAbstractor) -> Self {
        Self {
            resolver,
            abstractor,
            group: PathGroup::default(),
            skipped: Vec::new(),
        }
    }

    /// Add one path.
    ///
    /// # Arguments
    /// * `path` - Absolute path, stored as given
    ///
    /// # Returns
    /// `true` if the path was grouped, `false` if no root contains it or
    /// it is not valid UTF-8.
    pub fn add(&mut self, path: impl AsRef<Path>) -> bool {
        let original: &Path = path.as_ref();
        let Some(text): Option<&str> = original.to_str() else {
            log::warn!("Path {} is not valid UTF-8, skipping", original.display());
            self.skipped.push(original.to_path_buf());
            return false;
        };
        let abstracted: String = self.abstractor.abstract_path(text);

        let Some(resolved): Option<ResolvedPath> = self.resolver.resolve(&abstracted) else {
            log::debug!("No storage root for {}, skipping", original.display());
            self.skipped.push(original.to_path_buf());
            return false;
        };

        self.group.insert(
            resolved.storage_name(),
            resolved.path_cache.clone(),
            original.to_path_buf(),
        );
        true
    }

    /// Paths skipped so far because no root contains them.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Finish grouping.
    pub fn finish(self) -> PathGroup {
        self.group
    }
}

/// Group paths by storage and path cache.
///
/// # Arguments
/// * `paths` - Absolute paths to group
/// * `resolver` - Root resolver for the project
/// * `abstractor` - Sequence abstractor applied before resolution
pub fn group_by_storage<P: AsRef<Path>>(
    paths: &[P],
    resolver: &RootResolver,
    abstractor: &SequenceAbstractor,
) -> PathGroup {
    let mut builder: PathGroupBuilder = PathGroupBuilder::new(resolver, abstractor);
    for path in paths {
        builder.add(path);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageRoot;
    use publish_resolver_templates::{PatternTemplate, TemplateField, TemplateSet};
    use std::sync::Arc;

    fn project_resolver() -> RootResolver {
        RootResolver::from_roots(&[
            StorageRoot::new("primary", "/studio/proj"),
            StorageRoot::new("Renders", "/renders/proj"),
        ])
    }

    fn frame_abstractor() -> SequenceAbstractor {
        let frame: TemplateField = TemplateField::new("frame")
            .with_pattern(r"\d+")
            .with_default("default")
            .abstract_field();
        let template: PatternTemplate = PatternTemplate::new(
            "shot_scene",
            "/studio/proj/seq/shot_{frame}.ma",
            vec![frame],
        )
        .unwrap();
        SequenceAbstractor::new(Arc::new(TemplateSet::with_templates(vec![template])))
    }

    #[test]
    fn test_group_empty() {
        let paths: Vec<PathBuf> = Vec::new();
        let group: PathGroup =
            group_by_storage(&paths, &project_resolver(), &SequenceAbstractor::passthrough());
        assert!(group.is_empty());
        assert_eq!(group.path_count(), 0);
    }

    #[test]
    fn test_group_skips_paths_outside_roots() {
        let resolver: RootResolver = project_resolver();
        let abstractor: SequenceAbstractor = SequenceAbstractor::passthrough();
        let mut builder: PathGroupBuilder = PathGroupBuilder::new(&resolver, &abstractor);

        assert!(!builder.add("/elsewhere/a.ma"));
        assert_eq!(builder.skipped(), &[PathBuf::from("/elsewhere/a.ma")]);

        let group: PathGroup = builder.finish();
        assert!(group.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_group_skips_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let resolver: RootResolver = project_resolver();
        let abstractor: SequenceAbstractor = SequenceAbstractor::passthrough();
        let mut builder: PathGroupBuilder = PathGroupBuilder::new(&resolver, &abstractor);

        let invalid: &Path = Path::new(OsStr::from_bytes(b"/studio/proj/scenes/\xff.ma"));
        assert!(!builder.add(invalid));
        assert!(builder.add("/studio/proj/scenes/a.ma"));
        assert_eq!(builder.skipped(), &[invalid.to_path_buf()]);

        let group: PathGroup = builder.finish();
        assert_eq!(group.path_count(), 1);
    }

    #[test]
    fn test_group_primary_is_aliased() {
        let group: PathGroup = group_by_storage(
            &["/studio/proj/scenes/a.ma"],
            &project_resolver(),
            &SequenceAbstractor::passthrough(),
        );

        assert_eq!(group.storage_names().collect::<Vec<_>>(), vec!["Tank"]);
        assert_eq!(
            group.paths_for("Tank", "proj/scenes/a.ma"),
            &[PathBuf::from("/studio/proj/scenes/a.ma")]
        );
    }

    #[test]
    fn test_group_multiple_storages() {
        let group: PathGroup = group_by_storage(
            &[
                "/studio/proj/scenes/a.ma",
                "/renders/proj/sh010/beauty.exr",
                "/studio/proj/scenes/b.ma",
            ],
            &project_resolver(),
            &SequenceAbstractor::passthrough(),
        );

        assert_eq!(group.storage_count(), 2);
        assert_eq!(group.path_count(), 3);
        assert_eq!(group.path_caches("Tank").unwrap().len(), 2);
        assert_eq!(
            group.paths_for("Renders", "proj/sh010/beauty.exr"),
            &[PathBuf::from("/renders/proj/sh010/beauty.exr")]
        );
    }

    #[test]
    fn test_group_sequence_frames_share_bucket() {
        let group: PathGroup = group_by_storage(
            &[
                "/studio/proj/seq/shot_0010.ma",
                "/studio/proj/seq/shot_0020.ma",
            ],
            &project_resolver(),
            &frame_abstractor(),
        );

        let caches: &BTreeMap<String, Vec<PathBuf>> = group.path_caches("Tank").unwrap();
        assert_eq!(caches.len(), 1);
        assert_eq!(
            group.paths_for("Tank", "proj/seq/shot_default.ma"),
            &[
                PathBuf::from("/studio/proj/seq/shot_0010.ma"),
                PathBuf::from("/studio/proj/seq/shot_0020.ma"),
            ]
        );
    }

    #[test]
    fn test_group_keeps_duplicates_and_case_variants() {
        let group: PathGroup = group_by_storage(
            &[
                "/studio/proj/a.ma",
                "/studio/proj/a.ma",
                "/STUDIO/proj/A.ma",
            ],
            &project_resolver(),
            &SequenceAbstractor::passthrough(),
        );

        assert_eq!(group.paths_for("Tank", "proj/a.ma").len(), 2);
        assert_eq!(
            group.paths_for("Tank", "proj/A.ma"),
            &[PathBuf::from("/STUDIO/proj/A.ma")]
        );
        assert_eq!(group.path_count(), 3);
    }

    #[test]
    fn test_paths_for_missing_bucket() {
        let group: PathGroup = PathGroup::default();
        assert!(group.paths_for("Tank", "proj/a.ma").is_empty());
        assert!(group.path_caches("Tank").is_none());
    }
}
