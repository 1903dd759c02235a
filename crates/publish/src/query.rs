//! Batched publish lookups, one registry query per storage.

use std::collections::BTreeMap;

use publish_resolver_registry::{entity, field, Filter, Record, RegistryClient};
use publish_resolver_roots::PathGroup;

use crate::error::PublishError;

/// Publish records found per storage name.
pub type QueryResults = BTreeMap<String, Vec<Record>>;

/// Fields every publish query returns.
const REQUIRED_FIELDS: [&str; 2] = [field::CREATED_AT, field::PATH_CACHE];

/// Looks up the publish records for a [`PathGroup`].
///
/// For every storage in the group the storage entity is fetched and then
/// all publishes whose path cache is one of the storage's keys are fetched
/// in a single query.
pub struct PublishQuery<'a> {
    registry: &'a dyn RegistryClient,
    filters: Vec<Filter>,
    fields: Vec<String>,
}

impl<'a> PublishQuery<'a> {
    /// Create a query without extra filters or fields.
    ///
    /// # Arguments
    /// * `registry` - Registry to query
    pub fn new(registry: &'a dyn RegistryClient) -> Self {
        Self {
            registry,
            filters: Vec::new(),
            fields: requested_fields(&[]),
        }
    }

    /// Add filters applied to every publish query.
    ///
    /// # Arguments
    /// * `filters` - Extra conditions, combined with the path cache filters
    pub fn with_filters(mut self, filters: &[Filter]) -> Self {
        self.filters.extend_from_slice(filters);
        self
    }

    /// Request extra fields.
    ///
    /// `created_at` and `path_cache` are always requested; duplicates are
    /// dropped.
    ///
    /// # Arguments
    /// * `fields` - Field names
    pub fn with_fields(mut self, fields: &[String]) -> Self {
        let mut combined: Vec<String> = self.fields;
        combined.extend_from_slice(fields);
        self.fields = requested_fields(&combined);
        self
    }

    /// Fields each query will request.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Run the queries.
    ///
    /// # Arguments
    /// * `group` - Paths grouped by storage and path cache
    ///
    /// # Returns
    /// The publish records of each storage, in registry order.
    ///
    /// # Errors
    /// Returns [`PublishError::ConfigurationMismatch`] if a storage is not
    /// known to the registry, or the registry error of a failed call.
    pub fn run(&self, group: &PathGroup) -> Result<QueryResults, PublishError> {
        let mut results: QueryResults = QueryResults::new();

        for (storage, path_caches) in group.iter() {
            let local_storage: Record = self
                .registry
                .find_one(
                    entity::LOCAL_STORAGE,
                    &[Filter::is(field::CODE, storage)],
                    &[],
                )?
                .ok_or_else(|| PublishError::ConfigurationMismatch {
                    storage: storage.to_string(),
                })?;

            let mut filters: Vec<Filter> = self.filters.clone();
            filters.push(Filter::is_in(field::PATH_CACHE, path_caches.keys().cloned()));
            filters.push(Filter::is(
                field::PATH_CACHE_STORAGE,
                local_storage.entity_ref(),
            ));

            let publishes: Vec<Record> =
                self.registry
                    .find(entity::PUBLISHED_FILE, &filters, &self.fields)?;
            log::debug!(
                "Found {} publishes for {} path caches in storage {}",
                publishes.len(),
                path_caches.len(),
                storage
            );
            results.insert(storage.to_string(), publishes);
        }

        Ok(results)
    }
}

/// Combine requested fields with the required ones, keeping first
/// occurrences in order.
fn requested_fields(extra: &[String]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::with_capacity(extra.len() + REQUIRED_FIELDS.len());
    let candidates = extra
        .iter()
        .map(String::as_str)
        .chain(REQUIRED_FIELDS.iter().copied());
    for name in candidates {
        if !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    }
    fields
}
