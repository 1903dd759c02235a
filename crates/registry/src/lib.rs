//! Asset registry access for the publish pipeline.
//!
//! This crate defines the interface the pipeline uses to talk to the
//! published-asset registry and ships one implementation of it:
//!
//! - **`RegistryClient`** - find / create / thumbnail upload contract
//! - **`SqliteRegistry`** - embedded registry in a local SQLite database
//!
//! # Records and filters
//!
//! Registry entities are untyped field maps ([`Record`]) that always carry
//! their `type` and `id`. Queries are conjunctions of [`Filter`]s; entity
//! references inside filters compare by type and id.
//!
//! # Connection configuration
//!
//! [`ConnectionConfig`] reads the studio's registry connection file and
//! [`resolve_script_user`] finds the API user it authenticates as.

mod config;
mod error;
mod sqlite;
mod traits;
mod types;

pub use config::{resolve_script_user, ConnectionConfig};
pub use error::RegistryError;
pub use sqlite::SqliteRegistry;
pub use traits::RegistryClient;
pub use types::{
    entity, field, format_timestamp, parse_timestamp, EntityRef, Filter, FilterOperator, Record,
};
