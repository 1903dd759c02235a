//! Embedded SQLite registry.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};

use crate::error::RegistryError;
use crate::traits::RegistryClient;
use crate::types::{field, format_timestamp, EntityRef, Filter, Record};

/// Registry stored in a local SQLite database.
///
/// Entities are kept as JSON documents keyed by an autoincrement id, so any
/// entity type and field set can be stored. Filters are evaluated in
/// process. Used for offline work and as the registry in tests.
pub struct SqliteRegistry {
    /// Database connection (protected by mutex for thread safety).
    conn: Mutex<Connection>,
    /// Entity table name (versioned for schema migrations).
    entities_table: String,
    /// Thumbnail table name.
    thumbnails_table: String,
    /// User reported by `current_user`.
    current_user: Option<EntityRef>,
}

impl SqliteRegistry {
    /// Database schema version.
    const REGISTRY_DB_VERSION: u32 = 1;

    /// Create or open a registry database at the given path.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or initialized.
    pub fn open(db_path: &Path) -> Result<Self, RegistryError> {
        let conn: Connection = Connection::open(db_path)?;

        // WAL for concurrent readers
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::initialize(conn)
    }

    /// Create a registry that lives only in memory.
    ///
    /// # Errors
    /// Returns error if the database cannot be initialized.
    pub fn open_in_memory() -> Result<Self, RegistryError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self, RegistryError> {
        let entities_table: String = format!("entities_v{}", Self::REGISTRY_DB_VERSION);
        let thumbnails_table: String = format!("thumbnails_v{}", Self::REGISTRY_DB_VERSION);

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    entity_type TEXT NOT NULL,
                    data TEXT NOT NULL
                )",
                entities_table
            ),
            [],
        )?;
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_entity_type ON {}(entity_type)",
                entities_table, entities_table
            ),
            [],
        )?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    entity_type TEXT NOT NULL,
                    entity_id INTEGER NOT NULL,
                    path TEXT NOT NULL,
                    uploaded_at TEXT NOT NULL
                )",
                thumbnails_table
            ),
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            entities_table,
            thumbnails_table,
            current_user: None,
        })
    }

    /// Set the user reported as the authenticated user.
    ///
    /// # Arguments
    /// * `user` - User entity reference
    pub fn with_current_user(mut self, user: EntityRef) -> Self {
        self.current_user = Some(user);
        self
    }

    /// Number of stored entities of a type.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    pub fn count(&self, entity_type: &str) -> Result<usize, RegistryError> {
        let conn: MutexGuard<'_, Connection> = self.lock()?;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE entity_type = ?",
                self.entities_table
            ),
            params![entity_type],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Thumbnail files uploaded for an entity, oldest first.
    ///
    /// # Arguments
    /// * `entity_type` - Entity type
    /// * `id` - Entity id
    pub fn thumbnails(&self, entity_type: &str, id: i64) -> Result<Vec<String>, RegistryError> {
        let conn: MutexGuard<'_, Connection> = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT path FROM {} WHERE entity_type = ? AND entity_id = ? ORDER BY rowid",
            self.thumbnails_table
        ))?;
        let paths: Vec<String> = stmt
            .query_map(params![entity_type, id], |row| row.get(0))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()?;
        Ok(paths)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RegistryError> {
        self.conn
            .lock()
            .map_err(|_| RegistryError::Sqlite("registry connection lock poisoned".into()))
    }

    fn load_all(&self, entity_type: &str) -> Result<Vec<Record>, RegistryError> {
        let conn: MutexGuard<'_, Connection> = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, data FROM {} WHERE entity_type = ? ORDER BY id",
            self.entities_table
        ))?;
        let rows: Vec<(i64, String)> = stmt
            .query_map(params![entity_type], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(i64, String)>, rusqlite::Error>>()?;
        drop(stmt);
        drop(conn);

        let mut records: Vec<Record> = Vec::with_capacity(rows.len());
        for (id, data) in rows {
            let fields: Map<String, Value> = serde_json::from_str(&data)?;
            let record: Record = fields
                .into_iter()
                .fold(Record::new(entity_type, id), |record, (name, value)| {
                    record.with_field(name, value)
                });
            records.push(record);
        }
        Ok(records)
    }

    fn exists(&self, entity_type: &str, id: i64) -> Result<bool, RegistryError> {
        let conn: MutexGuard<'_, Connection> = self.lock()?;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE entity_type = ? AND id = ?",
                self.entities_table
            ),
            params![entity_type, id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl RegistryClient for SqliteRegistry {
    fn find(
        &self,
        entity_type: &str,
        filters: &[Filter],
        fields: &[String],
    ) -> Result<Vec<Record>, RegistryError> {
        let records: Vec<Record> = self
            .load_all(entity_type)?
            .iter()
            .filter(|record| filters.iter().all(|filter| filter.matches(record)))
            .map(|record| record.select(fields))
            .collect();
        Ok(records)
    }

    fn create(
        &self,
        entity_type: &str,
        mut data: Map<String, Value>,
    ) -> Result<Record, RegistryError> {
        data.remove(field::TYPE);
        data.remove(field::ID);
        if !data.contains_key(field::CREATED_AT) {
            data.insert(
                field::CREATED_AT.into(),
                Value::from(format_timestamp(Utc::now())),
            );
        }

        let encoded: String = serde_json::to_string(&data)?;
        let id: i64 = {
            let conn: MutexGuard<'_, Connection> = self.lock()?;
            conn.execute(
                &format!(
                    "INSERT INTO {} (entity_type, data) VALUES (?, ?)",
                    self.entities_table
                ),
                params![entity_type, encoded],
            )?;
            conn.last_insert_rowid()
        };

        log::debug!("Created {} {}", entity_type, id);
        Ok(data
            .into_iter()
            .fold(Record::new(entity_type, id), |record, (name, value)| {
                record.with_field(name, value)
            }))
    }

    fn upload_thumbnail(&self, entity_type: &str, id: i64, path: &Path) -> Result<(), RegistryError> {
        if !self.exists(entity_type, id)? {
            return Err(RegistryError::NotFound {
                entity_type: entity_type.to_string(),
                id,
            });
        }

        let conn: MutexGuard<'_, Connection> = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (entity_type, entity_id, path, uploaded_at) VALUES (?, ?, ?, ?)",
                self.thumbnails_table
            ),
            params![
                entity_type,
                id,
                path.to_string_lossy().into_owned(),
                format_timestamp(Utc::now())
            ],
        )?;
        Ok(())
    }

    fn current_user(&self) -> Result<Option<EntityRef>, RegistryError> {
        Ok(self.current_user.clone())
    }
}

impl std::fmt::Debug for SqliteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRegistry")
            .field("entities_table", &self.entities_table)
            .field("current_user", &self.current_user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::entity;
    use serde_json::json;
    use tempfile::TempDir;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_create_assigns_ids_and_created_at() {
        let registry: SqliteRegistry = SqliteRegistry::open_in_memory().unwrap();

        let first: Record = registry
            .create(entity::LOCAL_STORAGE, data(json!({"code": "Tank"})))
            .unwrap();
        let second: Record = registry
            .create(entity::LOCAL_STORAGE, data(json!({"code": "Renders"})))
            .unwrap();

        assert_eq!(first.entity_type(), "LocalStorage");
        assert!(second.id() > first.id());
        assert!(first.created_at().is_some());
        assert_eq!(registry.count(entity::LOCAL_STORAGE).unwrap(), 2);
        assert_eq!(registry.count(entity::PUBLISHED_FILE).unwrap(), 0);
    }

    #[test]
    fn test_create_keeps_explicit_created_at_and_ignores_type_id() {
        let registry: SqliteRegistry = SqliteRegistry::open_in_memory().unwrap();
        let record: Record = registry
            .create(
                entity::PUBLISHED_FILE,
                data(json!({"type": "Other", "id": 500, "created_at": "2020-01-01T00:00:00Z"})),
            )
            .unwrap();

        assert_eq!(record.entity_type(), entity::PUBLISHED_FILE);
        assert_ne!(record.id(), 500);
        assert_eq!(record.get(field::CREATED_AT), Some(&json!("2020-01-01T00:00:00Z")));
    }

    #[test]
    fn test_find_filters_and_projects() {
        let registry: SqliteRegistry = SqliteRegistry::open_in_memory().unwrap();
        let storage: Record = registry
            .create(entity::LOCAL_STORAGE, data(json!({"code": "Tank"})))
            .unwrap();
        registry
            .create(
                entity::PUBLISHED_FILE,
                data(json!({
                    "path_cache": "proj/a.ma",
                    "path_cache_storage": storage.entity_ref(),
                    "code": "a.ma",
                })),
            )
            .unwrap();
        registry
            .create(
                entity::PUBLISHED_FILE,
                data(json!({"path_cache": "proj/b.ma", "path_cache_storage": storage.entity_ref()})),
            )
            .unwrap();

        let found: Vec<Record> = registry
            .find(
                entity::PUBLISHED_FILE,
                &[
                    Filter::is(field::PATH_CACHE_STORAGE, storage.entity_ref()),
                    Filter::is_in(field::PATH_CACHE, ["proj/a.ma", "proj/c.ma"]),
                ],
                &fields(&["path_cache"]),
            )
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path_cache(), Some("proj/a.ma"));
        assert!(found[0].get("code").is_none());
    }

    #[test]
    fn test_find_one() {
        let registry: SqliteRegistry = SqliteRegistry::open_in_memory().unwrap();
        registry
            .create(entity::PUBLISH_TYPE, data(json!({"code": "Maya Scene"})))
            .unwrap();

        let found: Option<Record> = registry
            .find_one(entity::PUBLISH_TYPE, &[Filter::is(field::CODE, "Maya Scene")], &[])
            .unwrap();
        assert!(found.is_some());

        let missing: Option<Record> = registry
            .find_one(entity::PUBLISH_TYPE, &[Filter::is(field::CODE, "Nuke Script")], &[])
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_upload_thumbnail() {
        let registry: SqliteRegistry = SqliteRegistry::open_in_memory().unwrap();
        let publish: Record = registry
            .create(entity::PUBLISHED_FILE, data(json!({"code": "a.ma"})))
            .unwrap();

        registry
            .upload_thumbnail(entity::PUBLISHED_FILE, publish.id(), Path::new("/tmp/thumb.png"))
            .unwrap();
        assert_eq!(
            registry.thumbnails(entity::PUBLISHED_FILE, publish.id()).unwrap(),
            vec!["/tmp/thumb.png".to_string()]
        );

        let result: Result<(), RegistryError> =
            registry.upload_thumbnail(entity::TASK, 999, Path::new("/tmp/thumb.png"));
        assert!(matches!(result, Err(RegistryError::NotFound { id: 999, .. })));
    }

    #[test]
    fn test_current_user() {
        let registry: SqliteRegistry = SqliteRegistry::open_in_memory().unwrap();
        assert_eq!(registry.current_user().unwrap(), None);

        let registry: SqliteRegistry = registry.with_current_user(EntityRef::new("HumanUser", 3));
        assert_eq!(registry.current_user().unwrap(), Some(EntityRef::new("HumanUser", 3)));
    }

    #[test]
    fn test_open_persists_across_connections() {
        let temp_dir: TempDir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("registry.db");

        {
            let registry: SqliteRegistry = SqliteRegistry::open(&db_path).unwrap();
            registry
                .create(entity::LOCAL_STORAGE, data(json!({"code": "Tank"})))
                .unwrap();
        }

        let registry: SqliteRegistry = SqliteRegistry::open(&db_path).unwrap();
        let found: Vec<Record> = registry
            .find(entity::LOCAL_STORAGE, &[], &fields(&["code"]))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get(field::CODE), Some(&json!("Tank")));
    }
}
