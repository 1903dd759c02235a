//! Registering new publishes.

use std::path::{Path, PathBuf};

use publish_resolver_common::file_name;
use publish_resolver_registry::{entity, field, EntityRef, Filter, Record};
use publish_resolver_roots::ResolvedPath;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::dependencies::DependencyLinker;
use crate::error::PublishError;
use crate::toolkit::Toolkit;

/// Optional settings for [`register_publish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Task to link; defaults to the context's task.
    pub task: Option<EntityRef>,
    /// Description stored on the publish.
    pub comment: Option<String>,
    /// Image uploaded as the publish's thumbnail.
    pub thumbnail_path: Option<PathBuf>,
    /// Files the publish depends on. Paths without a publish are ignored.
    pub dependency_paths: Vec<PathBuf>,
    /// Publish type code, e.g. `Maya Scene`.
    pub type_label: Option<String>,
    /// Also set the thumbnail on the context's entity.
    pub update_entity_thumbnail: bool,
    /// Also set the thumbnail on the task.
    pub update_task_thumbnail: bool,
}

impl RegisterOptions {
    /// Create options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: EntityRef) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail_path = Some(path.into());
        self
    }

    pub fn with_dependencies<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.dependency_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_type_label(mut self, label: impl Into<String>) -> Self {
        self.type_label = Some(label.into());
        self
    }

    pub fn update_entity_thumbnail(mut self, update: bool) -> Self {
        self.update_entity_thumbnail = update;
        self
    }

    pub fn update_task_thumbnail(mut self, update: bool) -> Self {
        self.update_task_thumbnail = update;
        self
    }

    /// Check the options before any registry call is made.
    ///
    /// # Errors
    /// Returns [`PublishError::InvalidOptions`] if the type label is blank.
    pub fn validate(&self) -> Result<(), PublishError> {
        if let Some(label) = &self.type_label {
            if label.trim().is_empty() {
                return Err(PublishError::InvalidOptions {
                    message: "publish type label must not be blank".into(),
                });
            }
        }
        Ok(())
    }
}

/// Creates publish records in the registry.
#[derive(Debug, Clone, Copy)]
pub struct PublishRegistrar<'a> {
    toolkit: &'a Toolkit,
}

impl<'a> PublishRegistrar<'a> {
    /// Create a registrar for a project.
    ///
    /// # Arguments
    /// * `toolkit` - Project toolkit
    pub fn new(toolkit: &'a Toolkit) -> Self {
        Self { toolkit }
    }

    /// Register a file or sequence as a new publish.
    ///
    /// Sequence paths are abstracted first, so frame paths register the
    /// whole sequence. After the record is created the thumbnail is uploaded
    /// and dependency edges are created for every dependency path that has a
    /// publish of its own.
    ///
    /// # Arguments
    /// * `context` - Context the publish belongs to
    /// * `path` - File or sequence path
    /// * `name` - Version-less name grouping the versions of this publish
    /// * `version_number` - Version of this publish
    /// * `options` - Optional settings
    ///
    /// # Returns
    /// The created publish record.
    ///
    /// # Errors
    /// Returns [`PublishError::InvalidOptions`] for a blank name or type
    /// label or a path that is not valid UTF-8, and [`PublishError::UnknownClassification`] for an unknown
    /// type. Registry errors abort the registration; a failure after the
    /// record was created leaves the record in place.
    pub fn register(
        &self,
        context: &Context,
        path: &Path,
        name: &str,
        version_number: i64,
        options: &RegisterOptions,
    ) -> Result<Record, PublishError> {
        if name.trim().is_empty() {
            return Err(PublishError::InvalidOptions {
                message: "publish name must not be blank".into(),
            });
        }
        options.validate()?;

        let Some(path): Option<&str> = path.to_str() else {
            return Err(PublishError::InvalidOptions {
                message: format!("publish path {} is not valid UTF-8", path.display()),
            });
        };
        let path: String = self.toolkit.abstractor().abstract_path(path);

        let publish_type: Option<Record> = match &options.type_label {
            Some(label) => Some(self.find_publish_type(context, label)?),
            None => None,
        };

        let task: Option<&EntityRef> = options.task.as_ref().or(context.task.as_ref());

        let mut data: Map<String, Value> = Map::new();
        data.insert(field::CODE.into(), Value::from(file_name(&path)));
        data.insert(field::DESCRIPTION.into(), options.comment.clone().into());
        data.insert(field::NAME.into(), Value::from(name));
        data.insert(field::PROJECT.into(), context.project.to_value());
        data.insert(field::ENTITY.into(), optional_ref(context.entity.as_ref()));
        data.insert(field::TASK.into(), optional_ref(task));
        data.insert(field::VERSION_NUMBER.into(), Value::from(version_number));
        data.insert(field::PATH.into(), local_path(&path));
        match self.toolkit.resolver().resolve(&path) {
            Some(resolved) => {
                data.insert(field::PATH_CACHE.into(), Value::from(resolved.path_cache.clone()));
                if let Some(storage) = self.find_storage(&resolved)? {
                    data.insert(field::PATH_CACHE_STORAGE.into(), storage.entity_ref().to_value());
                }
            }
            None => {
                log::debug!("{} is outside every storage root, registering without path cache", path);
                data.insert(field::PATH_CACHE.into(), Value::Null);
            }
        }
        if let Some(user) = self.toolkit.registry().current_user()? {
            data.insert(field::CREATED_BY.into(), user.to_value());
        }
        if let Some(publish_type) = &publish_type {
            data.insert(field::PUBLISH_TYPE.into(), publish_type.entity_ref().to_value());
        }

        let publish: Record = self
            .toolkit
            .registry()
            .create(entity::PUBLISHED_FILE, data)?;
        log::debug!("Registered publish {} for {}", publish.id(), path);

        if let Some(thumbnail) = &options.thumbnail_path {
            self.upload_thumbnails(&publish, context, task, thumbnail, options)?;
        }

        DependencyLinker::new(self.toolkit).link(&publish, &options.dependency_paths)?;

        Ok(publish)
    }

    fn find_publish_type(&self, context: &Context, label: &str) -> Result<Record, PublishError> {
        self.toolkit
            .registry()
            .find_one(
                entity::PUBLISH_TYPE,
                &[
                    Filter::is(field::CODE, label),
                    Filter::is(field::PROJECT, context.project.clone()),
                ],
                &[],
            )?
            .ok_or_else(|| PublishError::UnknownClassification {
                label: label.to_string(),
            })
    }

    fn find_storage(&self, resolved: &ResolvedPath) -> Result<Option<Record>, PublishError> {
        let storage: Option<Record> = self.toolkit.registry().find_one(
            entity::LOCAL_STORAGE,
            &[Filter::is(field::CODE, resolved.storage_name())],
            &[],
        )?;
        if storage.is_none() {
            log::warn!(
                "No storage {} in the registry, registering without path cache storage",
                resolved.storage_name()
            );
        }
        Ok(storage)
    }

    fn upload_thumbnails(
        &self,
        publish: &Record,
        context: &Context,
        task: Option<&EntityRef>,
        thumbnail: &Path,
        options: &RegisterOptions,
    ) -> Result<(), PublishError> {
        if !thumbnail.exists() {
            log::warn!(
                "Thumbnail {} does not exist, skipping upload",
                thumbnail.display()
            );
            return Ok(());
        }

        let registry = self.toolkit.registry();
        registry.upload_thumbnail(publish.entity_type(), publish.id(), thumbnail)?;

        if options.update_entity_thumbnail {
            if let Some(entity) = &context.entity {
                registry.upload_thumbnail(&entity.entity_type, entity.id, thumbnail)?;
            }
        }

        if options.update_task_thumbnail {
            if let Some(task) = task {
                registry.upload_thumbnail(entity::TASK, task.id, thumbnail)?;
            }
        }

        Ok(())
    }
}

fn optional_ref(entity: Option<&EntityRef>) -> Value {
    entity.map(EntityRef::to_value).unwrap_or(Value::Null)
}

fn local_path(path: &str) -> Value {
    let mut object: Map<String, Value> = Map::new();
    object.insert(field::LOCAL_PATH.into(), Value::from(path));
    Value::Object(object)
}

/// Register a file or sequence as a new publish.
///
/// See [`PublishRegistrar::register`].
pub fn register_publish(
    toolkit: &Toolkit,
    context: &Context,
    path: &Path,
    name: &str,
    version_number: i64,
    options: &RegisterOptions,
) -> Result<Record, PublishError> {
    PublishRegistrar::new(toolkit).register(context, path, name, version_number, options)
}
