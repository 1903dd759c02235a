//! Registry client interface.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::RegistryError;
use crate::types::{EntityRef, Filter, Record};

/// Operations the publish pipeline needs from the asset registry.
///
/// Every call is a blocking round trip. Implementations must not retry;
/// errors are handed back to the caller unchanged.
pub trait RegistryClient: Send + Sync {
    /// Find all entities of a type matching every filter.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type (e.g. `TankPublishedFile`)
    /// * `filters` - Conjunction of filters
    /// * `fields` - Fields to return in addition to `type` and `id`
    fn find(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[String],
    ) -> Result<Vec<Record>, RegistryError>;

    /// Find the first entity of a type matching every filter.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    /// * `filters` - Conjunction of filters
    /// * `fields` - Fields to return in addition to `type` and `id`
    fn find_one(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[String],
    ) -> Result<Option<Record>, RegistryError> {
        Ok(self.find(entity_type, filters, fields)?.into_iter().next())
    }

    /// Create an entity.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    /// * `data` - Field values
    ///
    /// # Returns
    /// The created record, including its new id.
    fn create(&self, entity_type: &str, data: Map<String, Value>) -> Result<Record, RegistryError>;

    /// Upload an image file as an entity's thumbnail.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    /// * `id` - Entity id
    /// * `path` - Image file on disk
    fn upload_thumbnail(&self, entity_type: &str, id: i64, path: &Path)
        -> Result<(), RegistryError>;

    /// The user the client is authenticated as, if it can be determined.
    fn current_user(&self) -> Result<Option<EntityRef>, RegistryError> {
        Ok(None)
    }
}
