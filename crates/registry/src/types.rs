//! Shared data structures for registry operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RegistryError;

/// Entity type names used by the publish pipeline.
pub mod entity {
    /// A published file.
    pub const PUBLISHED_FILE: &str = "TankPublishedFile";
    /// A storage known to the registry.
    pub const LOCAL_STORAGE: &str = "LocalStorage";
    /// A publish type classification.
    pub const PUBLISH_TYPE: &str = "TankType";
    /// A dependency edge between two published files.
    pub const DEPENDENCY: &str = "TankDependency";
    /// A registry API script user.
    pub const API_USER: &str = "ApiUser";
    /// A pipeline task.
    pub const TASK: &str = "Task";
}

/// Field names used by the publish pipeline.
pub mod field {
    pub const TYPE: &str = "type";
    pub const ID: &str = "id";
    pub const CODE: &str = "code";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const PROJECT: &str = "project";
    pub const ENTITY: &str = "entity";
    pub const TASK: &str = "task";
    pub const VERSION_NUMBER: &str = "version_number";
    pub const PATH: &str = "path";
    pub const LOCAL_PATH: &str = "local_path";
    pub const PATH_CACHE: &str = "path_cache";
    pub const PATH_CACHE_STORAGE: &str = "path_cache_storage";
    pub const CREATED_AT: &str = "created_at";
    pub const CREATED_BY: &str = "created_by";
    pub const PUBLISH_TYPE: &str = "tank_type";
    pub const FIRSTNAME: &str = "firstname";
    /// Dependency edge: the publish that depends on another.
    pub const DEPENDENT_PUBLISH: &str = "tank_published_file";
    /// Dependency edge: the publish being depended on.
    pub const DEPENDENCY_PUBLISH: &str = "dependent_tank_published_file";
}

/// Reference to a registry entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Entity id.
    pub id: i64,
}

impl EntityRef {
    /// Create an entity reference.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    /// * `id` - Entity id
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }

    /// Read a reference from a `{type, id}` mapping.
    ///
    /// Extra keys are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object: &Map<String, Value> = value.as_object()?;
        Some(Self {
            entity_type: object.get(field::TYPE)?.as_str()?.to_string(),
            id: object.get(field::ID)?.as_i64()?,
        })
    }

    /// Encode as a `{type, id}` mapping.
    pub fn to_value(&self) -> Value {
        let mut object: Map<String, Value> = Map::new();
        object.insert(field::TYPE.into(), Value::from(self.entity_type.clone()));
        object.insert(field::ID.into(), Value::from(self.id));
        Value::Object(object)
    }
}

impl From<EntityRef> for Value {
    fn from(entity: EntityRef) -> Self {
        entity.to_value()
    }
}

/// Format a timestamp the way the registry stores `created_at`.
///
/// # Arguments
/// * `timestamp` - UTC timestamp
///
/// # Returns
/// ISO 8601 string with microsecond precision, e.g. `2024-01-01T00:00:00.000000Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Parse a `created_at` value.
///
/// Accepts RFC 3339 strings and epoch seconds (integer or float).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(number) => {
            if let Some(seconds) = number.as_i64() {
                DateTime::from_timestamp(seconds, 0)
            } else {
                let seconds: f64 = number.as_f64()?;
                let micros: i64 = (seconds * 1_000_000.0).round() as i64;
                DateTime::from_timestamp_micros(micros)
            }
        }
        _ => None,
    }
}

/// A registry entity as returned by queries.
///
/// Always carries `type` and `id`; other fields are whatever the query
/// requested or the create call stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record with only its type and id.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    /// * `id` - Entity id
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        let mut fields: Map<String, Value> = Map::new();
        fields.insert(field::TYPE.into(), Value::from(entity_type.into()));
        fields.insert(field::ID.into(), Value::from(id));
        Self { fields }
    }

    /// Build a record from a field mapping.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidRecord`] if `type` or `id` is missing.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self, RegistryError> {
        if EntityRef::from_value(&Value::Object(fields.clone())).is_none() {
            return Err(RegistryError::InvalidRecord(format!(
                "record without type and id: {}",
                Value::Object(fields)
            )));
        }
        Ok(Self { fields })
    }

    /// Set a field.
    ///
    /// `type` and `id` cannot be overwritten.
    ///
    /// # Arguments
    /// * `name` - Field name
    /// * `value` - Field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name: String = name.into();
        if name != field::TYPE && name != field::ID {
            self.fields.insert(name, value.into());
        }
        self
    }

    /// Entity type.
    pub fn entity_type(&self) -> &str {
        self.fields
            .get(field::TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Entity id.
    pub fn id(&self) -> i64 {
        self.fields
            .get(field::ID)
            .and_then(Value::as_i64)
            .unwrap_or_default()
    }

    /// Reference to this record.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_type(), self.id())
    }

    /// Get a field value.
    ///
    /// # Arguments
    /// * `name` - Field name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The `path_cache` field, if set to a string.
    pub fn path_cache(&self) -> Option<&str> {
        self.get(field::PATH_CACHE).and_then(Value::as_str)
    }

    /// The `created_at` field, if present and parseable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get(field::CREATED_AT).and_then(parse_timestamp)
    }

    /// Copy of this record restricted to `type`, `id` and `fields`.
    ///
    /// Requested fields the record lacks come back as `null`.
    ///
    /// # Arguments
    /// * `fields` - Field names to keep
    pub fn select(&self, fields: &[String]) -> Record {
        let mut selected: Record = Record::new(self.entity_type(), self.id());
        for name in fields {
            let value: Value = self.fields.get(name).cloned().unwrap_or(Value::Null);
            selected = selected.with_field(name.clone(), value);
        }
        selected
    }

    /// Borrow all fields.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Field equals the value.
    Is,
    /// Field equals one of the values.
    In,
}

/// One `(field, operator, value)` condition of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field to compare.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Value, or array of values for [`FilterOperator::In`].
    pub value: Value,
}

impl Filter {
    /// Field equals `value`.
    ///
    /// # Arguments
    /// * `field` - Field name
    /// * `value` - Expected value
    pub fn is(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Is,
            value: value.into(),
        }
    }

    /// Field equals one of `values`.
    ///
    /// # Arguments
    /// * `field` - Field name
    /// * `values` - Accepted values
    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::In,
            value: Value::Array(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Check whether a record satisfies this filter.
    ///
    /// Entity references compare by type and id only. A missing field
    /// compares as `null`.
    ///
    /// # Arguments
    /// * `record` - Record with all of its fields
    pub fn matches(&self, record: &Record) -> bool {
        let actual: &Value = record.get(&self.field).unwrap_or(&Value::Null);
        match self.operator {
            FilterOperator::Is => values_equal(actual, &self.value),
            FilterOperator::In => match &self.value {
                Value::Array(candidates) => candidates.iter().any(|c| values_equal(actual, c)),
                single => values_equal(actual, single),
            },
        }
    }
}

/// Equality with entity references reduced to `(type, id)`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (EntityRef::from_value(a), EntityRef::from_value(b)) {
        (Some(left), Some(right)) => left == right,
        _ => a == b,
    }
}
