//! Registry connection configuration.

use std::path::{Path, PathBuf};

use publish_resolver_common::{
    config_core_dir, read_config_file, APP_STORE_CONFIG_FILE, SHOTGUN_CONFIG_FILE,
};
use serde::Deserialize;

use crate::error::RegistryError;
use crate::traits::RegistryClient;
use crate::types::{entity, field, EntityRef, Filter, Record};

/// Connection settings for a registry server.
///
/// Read from the studio's `shotgun.yml` (or `app_store.yml` for the app
/// store):
///
/// ```yaml
/// host: https://studio.example.com
/// api_script: toolkit
/// api_key: 0123456789abcdef
/// http_proxy: proxy.example.com:8080
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server URL.
    pub host: String,
    /// API script name.
    pub api_script: String,
    /// API script key.
    pub api_key: String,
    /// Optional HTTP proxy.
    pub http_proxy: Option<String>,
}

/// Connection file as written on disk; every field may be missing.
#[derive(Debug, Default, Deserialize)]
struct RawConnectionConfig {
    host: Option<String>,
    api_script: Option<String>,
    api_key: Option<String>,
    http_proxy: Option<String>,
}

impl ConnectionConfig {
    /// Load a connection file.
    ///
    /// # Arguments
    /// * `path` - Path to the YAML connection file
    ///
    /// # Errors
    /// Returns error if the file is missing, is not valid YAML, or lacks
    /// `host`, `api_script` or `api_key`.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents: String = read_config_file(path)?;
        Self::from_yaml_str(&contents, path)
    }

    /// Parse connection settings.
    ///
    /// # Arguments
    /// * `contents` - YAML text
    /// * `path` - File the text came from, used in error messages
    pub fn from_yaml_str(contents: &str, path: &Path) -> Result<Self, RegistryError> {
        let display_path: String = path.display().to_string();

        let raw: RawConnectionConfig =
            match serde_yaml::from_str::<Option<RawConnectionConfig>>(contents) {
                Ok(raw) => raw.unwrap_or_default(),
                Err(e) => {
                    return Err(RegistryError::Config {
                        path: display_path,
                        message: e.to_string(),
                    })
                }
            };

        let required = |value: Option<String>, field: &'static str| {
            value.ok_or_else(|| RegistryError::MissingConfigField {
                path: display_path.clone(),
                field,
            })
        };

        Ok(Self {
            host: required(raw.host, "host")?,
            api_script: required(raw.api_script, "api_script")?,
            api_key: required(raw.api_key, "api_key")?,
            http_proxy: raw.http_proxy,
        })
    }

    /// Load the registry connection of a studio.
    ///
    /// # Arguments
    /// * `studio_root` - Directory containing the studio's projects
    pub fn for_studio(studio_root: &Path) -> Result<Self, RegistryError> {
        Self::load(&config_core_dir(studio_root).join(SHOTGUN_CONFIG_FILE))
    }

    /// Load the registry connection of the studio a project belongs to.
    ///
    /// # Arguments
    /// * `project_root` - Project directory; its parent is the studio root
    pub fn for_project(project_root: &Path) -> Result<Self, RegistryError> {
        Self::for_studio(&studio_root(project_root))
    }

    /// Load the app store connection of a studio.
    ///
    /// # Arguments
    /// * `studio_root` - Directory containing the studio's projects
    pub fn app_store_for_studio(studio_root: &Path) -> Result<Self, RegistryError> {
        Self::load(&config_core_dir(studio_root).join(APP_STORE_CONFIG_FILE))
    }

    /// Load the app store connection of the studio a project belongs to.
    ///
    /// # Arguments
    /// * `project_root` - Project directory; its parent is the studio root
    pub fn app_store_for_project(project_root: &Path) -> Result<Self, RegistryError> {
        Self::app_store_for_studio(&studio_root(project_root))
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("api_script", &self.api_script)
            .field("api_key", &"<redacted>")
            .field("http_proxy", &self.http_proxy)
            .finish()
    }
}

fn studio_root(project_root: &Path) -> PathBuf {
    match project_root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => project_root.join(".."),
    }
}

/// Look up the API user a connection authenticates as.
///
/// # Arguments
/// * `registry` - Registry to query
/// * `config` - Connection whose `api_script` names the user
///
/// # Errors
/// Returns [`RegistryError::ScriptUserNotFound`] if no `ApiUser` has the
/// script name as its first name.
pub fn resolve_script_user(
    registry: &dyn RegistryClient,
    config: &ConnectionConfig,
) -> Result<EntityRef, RegistryError> {
    let user: Option<Record> = registry.find_one(
        entity::API_USER,
        &[Filter::is(field::FIRSTNAME, config.api_script.as_str())],
        &[],
    )?;

    user.map(|record| record.entity_ref())
        .ok_or_else(|| RegistryError::ScriptUserNotFound {
            script: config.api_script.clone(),
        })
}
