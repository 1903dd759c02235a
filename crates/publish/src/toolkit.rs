//! Project-bound pipeline handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use publish_resolver_registry::RegistryClient;
use publish_resolver_roots::{
    group_by_storage, PathGroup, RootConfiguration, RootResolver, RootTieBreak,
};
use publish_resolver_templates::SequenceAbstractor;

use crate::error::PublishError;
use crate::matcher::{PublishMatcher, TieBreak};

/// Everything the publish operations need for one project: the registry,
/// the project's storage roots and its sequence templates.
///
/// A `Toolkit` is immutable and can be shared between threads; each
/// operation builds its own per-call state.
#[derive(Clone)]
pub struct Toolkit {
    registry: Arc<dyn RegistryClient>,
    project_root: PathBuf,
    resolver: RootResolver,
    abstractor: SequenceAbstractor,
    tie_break: TieBreak,
}

impl Toolkit {
    /// Create a toolkit from explicit parts.
    ///
    /// # Arguments
    /// * `registry` - Registry client
    /// * `project_root` - Project directory
    /// * `resolver` - Resolver over the project's storage roots
    /// * `abstractor` - Sequence abstractor backed by the project's templates
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        project_root: impl Into<PathBuf>,
        resolver: RootResolver,
        abstractor: SequenceAbstractor,
    ) -> Self {
        Self {
            registry,
            project_root: project_root.into(),
            resolver,
            abstractor,
            tie_break: TieBreak::default(),
        }
    }

    /// Create a toolkit for a project on disk.
    ///
    /// Loads the project's roots file for the current host.
    ///
    /// # Arguments
    /// * `registry` - Registry client
    /// * `project_root` - Project directory
    /// * `abstractor` - Sequence abstractor backed by the project's templates
    ///
    /// # Errors
    /// Returns error if the roots file exists but cannot be loaded.
    pub fn for_project(
        registry: Arc<dyn RegistryClient>,
        project_root: &Path,
        abstractor: SequenceAbstractor,
    ) -> Result<Self, PublishError> {
        let config: RootConfiguration = RootConfiguration::load(project_root)?;
        log::debug!(
            "Loaded {} storage roots for {}",
            config.len(),
            project_root.display()
        );
        Ok(Self::new(
            registry,
            project_root,
            RootResolver::new(&config),
            abstractor,
        ))
    }

    /// Set the policy for overlapping storage roots.
    pub fn with_root_tie_break(mut self, tie_break: RootTieBreak) -> Self {
        self.resolver = self.resolver.with_tie_break(tie_break);
        self
    }

    /// Set the policy for publishes with equal creation times.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// The registry client.
    pub fn registry(&self) -> &dyn RegistryClient {
        self.registry.as_ref()
    }

    /// The project directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The storage root resolver.
    pub fn resolver(&self) -> &RootResolver {
        &self.resolver
    }

    /// The sequence abstractor.
    pub fn abstractor(&self) -> &SequenceAbstractor {
        &self.abstractor
    }

    /// A matcher using this toolkit's tie-break policy.
    pub fn matcher(&self) -> PublishMatcher {
        PublishMatcher::new().with_tie_break(self.tie_break)
    }

    /// Group paths by storage and path cache.
    ///
    /// # Arguments
    /// * `paths` - Absolute paths; paths outside every root are skipped
    pub fn group_by_storage<P: AsRef<Path>>(&self, paths: &[P]) -> PathGroup {
        group_by_storage(paths, &self.resolver, &self.abstractor)
    }
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("project_root", &self.project_root)
            .field("resolver", &self.resolver)
            .field("tie_break", &self.tie_break)
            .finish_non_exhaustive()
    }
}
