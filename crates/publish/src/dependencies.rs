//! Dependency edges between publishes.

use std::path::PathBuf;

use publish_resolver_registry::{entity, field, Record};
use serde_json::{Map, Value};

use crate::error::PublishError;
use crate::find::find_publish;
use crate::matcher::MatchResult;
use crate::toolkit::Toolkit;

/// Links a publish to the publishes of the files it depends on.
#[derive(Debug, Clone, Copy)]
pub struct DependencyLinker<'a> {
    toolkit: &'a Toolkit,
}

impl<'a> DependencyLinker<'a> {
    /// Create a linker for a project.
    ///
    /// # Arguments
    /// * `toolkit` - Project toolkit
    pub fn new(toolkit: &'a Toolkit) -> Self {
        Self { toolkit }
    }

    /// Create one dependency edge per dependency path that has a publish.
    ///
    /// All paths are looked up together. Paths without a publish are
    /// dropped; a path listed twice gets two edges.
    ///
    /// # Arguments
    /// * `publish` - The depending publish
    /// * `dependency_paths` - Files `publish` depends on
    ///
    /// # Returns
    /// Number of edges created.
    pub fn link(&self, publish: &Record, dependency_paths: &[PathBuf]) -> Result<usize, PublishError> {
        if dependency_paths.is_empty() {
            return Ok(0);
        }

        let matches: MatchResult = find_publish(self.toolkit, dependency_paths, &[], &[])?;

        let mut created: usize = 0;
        for path in dependency_paths {
            let Some(dependency) = matches.get(path) else {
                log::debug!("No publish for dependency {}, skipping", path.display());
                continue;
            };

            let mut data: Map<String, Value> = Map::new();
            data.insert(field::DEPENDENT_PUBLISH.into(), publish.entity_ref().to_value());
            data.insert(field::DEPENDENCY_PUBLISH.into(), dependency.entity_ref().to_value());
            self.toolkit.registry().create(entity::DEPENDENCY, data)?;
            created += 1;
        }

        log::debug!(
            "Linked publish {} to {} of {} dependencies",
            publish.id(),
            created,
            dependency_paths.len()
        );
        Ok(created)
    }
}
