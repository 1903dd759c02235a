//! Work context a publish is registered in.

use publish_resolver_registry::EntityRef;

/// The project, entity and task a piece of work belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Project entity.
    pub project: EntityRef,
    /// Entity being worked on (shot, asset, ...), if any.
    pub entity: Option<EntityRef>,
    /// Task being worked on, if any.
    pub task: Option<EntityRef>,
}

impl Context {
    /// Create a project-only context.
    ///
    /// # Arguments
    /// * `project` - Project entity
    pub fn new(project: EntityRef) -> Self {
        Self {
            project,
            entity: None,
            task: None,
        }
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Set the task.
    pub fn with_task(mut self, task: EntityRef) -> Self {
        self.task = Some(task);
        self
    }
}
