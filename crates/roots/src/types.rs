//! Storage root data structures.

use std::path::{Path, PathBuf};

use publish_resolver_common::{
    config_core_dir, read_config_file, PathError, PRIMARY_ROOT_NAME, ROOTS_FILE,
};
use serde::Deserialize;

use crate::error::RootConfigError;

/// A named absolute filesystem prefix configured for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    /// Root name, unique within a project (`primary` for the main storage).
    pub name: String,
    /// Absolute path of the project directory inside this storage.
    pub absolute_path: String,
}

impl StorageRoot {
    /// Create a storage root.
    ///
    /// # Arguments
    /// * `name` - Root name
    /// * `absolute_path` - Project directory inside the storage, any separator style
    pub fn new(name: impl Into<String>, absolute_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            absolute_path: absolute_path.into(),
        }
    }
}

/// Operating system family used to pick a root path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Linux,
    Macos,
}

impl OsFamily {
    /// Get the OS family for the current host.
    #[cfg(target_os = "windows")]
    pub fn host() -> Self {
        Self::Windows
    }

    /// Get the OS family for the current host.
    #[cfg(target_os = "macos")]
    pub fn host() -> Self {
        Self::Macos
    }

    /// Get the OS family for the current host.
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    pub fn host() -> Self {
        Self::Linux
    }

    /// Check if this OS family uses POSIX-style paths.
    pub fn is_posix(&self) -> bool {
        matches!(self, Self::Linux | Self::Macos)
    }
}

/// Per-OS storage paths of one entry in the roots file.
#[derive(Debug, Clone, Default, Deserialize)]
struct RootPaths {
    linux_path: Option<String>,
    mac_path: Option<String>,
    windows_path: Option<String>,
}

impl RootPaths {
    fn for_os(&self, os: OsFamily) -> Option<&str> {
        let path: Option<&String> = match os {
            OsFamily::Linux => self.linux_path.as_ref(),
            OsFamily::Macos => self.mac_path.as_ref(),
            OsFamily::Windows => self.windows_path.as_ref(),
        };
        path.map(String::as_str).filter(|p| !p.is_empty())
    }
}

/// The storage roots of one project, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfiguration {
    /// Configured roots.
    pub roots: Vec<StorageRoot>,
}

impl RootConfiguration {
    /// Create a configuration from explicit roots.
    ///
    /// # Arguments
    /// * `roots` - Storage roots; names are expected to be unique
    pub fn with_roots(roots: Vec<StorageRoot>) -> Self {
        Self { roots }
    }

    /// Load the roots of a project for the current host.
    ///
    /// Reads `<project_root>/tank/config/core/roots.yml`. Without a roots
    /// file the project directory itself is the `primary` root.
    ///
    /// # Arguments
    /// * `project_root` - The project directory
    ///
    /// # Errors
    /// Returns error if the roots file exists but cannot be read or parsed.
    pub fn load(project_root: &Path) -> Result<Self, RootConfigError> {
        Self::load_for_os(project_root, OsFamily::host())
    }

    /// Load the roots of a project for a given OS family.
    ///
    /// # Arguments
    /// * `project_root` - The project directory
    /// * `os` - OS family whose paths are used
    ///
    /// # Errors
    /// Returns error if the roots file exists but cannot be read or parsed.
    pub fn load_for_os(project_root: &Path, os: OsFamily) -> Result<Self, RootConfigError> {
        let roots_file: PathBuf = config_core_dir(project_root).join(ROOTS_FILE);

        let contents: String = match read_config_file(&roots_file) {
            Ok(contents) => contents,
            Err(PathError::NotFound { .. }) => {
                log::debug!(
                    "No roots file at {}, using project root as {}",
                    roots_file.display(),
                    PRIMARY_ROOT_NAME
                );
                return Ok(Self::with_roots(vec![StorageRoot::new(
                    PRIMARY_ROOT_NAME,
                    project_root.to_string_lossy(),
                )]));
            }
            Err(e) => return Err(e.into()),
        };

        let project_name: String = project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RootConfigError::InvalidProjectRoot {
                path: project_root.display().to_string(),
            })?;

        Self::from_yaml_str(&contents, &project_name, os).map_err(|e| match e {
            RootConfigError::Parse { message, .. } => RootConfigError::Parse {
                path: roots_file.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse a roots file.
    ///
    /// The file maps root names to per-OS storage paths. Each root's absolute
    /// path is the storage path joined with the project directory name.
    ///
    /// ```yaml
    /// primary:
    ///   linux_path: /mnt/studio
    ///   mac_path: /Volumes/studio
    ///   windows_path: 'S:\studio'
    /// ```
    ///
    /// # Arguments
    /// * `contents` - YAML text
    /// * `project_name` - Project directory name
    /// * `os` - OS family whose paths are used
    ///
    /// # Errors
    /// Returns error if the YAML is malformed or a root name is not a string.
    pub fn from_yaml_str(
        contents: &str,
        project_name: &str,
        os: OsFamily,
    ) -> Result<Self, RootConfigError> {
        let parse_error = |message: String| RootConfigError::Parse {
            path: ROOTS_FILE.to_string(),
            message,
        };

        let mapping: serde_yaml::Mapping = match serde_yaml::from_str::<Option<serde_yaml::Mapping>>(
            contents,
        ) {
            Ok(Some(mapping)) => mapping,
            Ok(None) => serde_yaml::Mapping::new(),
            Err(e) => return Err(parse_error(e.to_string())),
        };

        let mut roots: Vec<StorageRoot> = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name: String = key
                .as_str()
                .map(String::from)
                .ok_or_else(|| RootConfigError::InvalidRoot {
                    name: format!("{:?}", key),
                    reason: "root names must be strings".into(),
                })?;

            let paths: RootPaths = serde_yaml::from_value(value)
                .map_err(|e| parse_error(format!("root {}: {}", name, e)))?;

            match paths.for_os(os) {
                Some(storage_path) => {
                    let absolute_path: String = join_project(storage_path, project_name, os);
                    roots.push(StorageRoot::new(name, absolute_path));
                }
                None => {
                    log::warn!("Root {} has no storage path for {:?}, skipping", name, os);
                }
            }
        }

        Ok(Self::with_roots(roots))
    }

    /// Look up a root by name.
    ///
    /// # Arguments
    /// * `name` - Root name
    pub fn get(&self, name: &str) -> Option<&StorageRoot> {
        self.roots.iter().find(|root| root.name == name)
    }

    /// Number of configured roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if no roots are configured.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Join a project directory name onto a storage path with the OS separator.
fn join_project(storage_path: &str, project_name: &str, os: OsFamily) -> String {
    let separator: char = if os.is_posix() { '/' } else { '\\' };
    let trimmed: &str = storage_path.trim_end_matches(['/', '\\']);
    format!("{}{}{}", trimmed, separator, project_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ROOTS_YAML: &str = r#"
primary:
  linux_path: /mnt/studio
  mac_path: /Volumes/studio
  windows_path: 'S:\studio'
renders:
  linux_path: /mnt/renders/
  mac_path: /Volumes/renders
  windows_path: ''
"#;

    #[test]
    fn test_from_yaml_str_linux() {
        let config: RootConfiguration =
            RootConfiguration::from_yaml_str(ROOTS_YAML, "proj", OsFamily::Linux).unwrap();

        assert_eq!(
            config.roots,
            vec![
                StorageRoot::new("primary", "/mnt/studio/proj"),
                StorageRoot::new("renders", "/mnt/renders/proj"),
            ]
        );
    }

    #[test]
    fn test_from_yaml_str_windows_skips_empty_path() {
        let config: RootConfiguration =
            RootConfiguration::from_yaml_str(ROOTS_YAML, "proj", OsFamily::Windows).unwrap();

        assert_eq!(config.len(), 1);
        assert_eq!(config.roots[0], StorageRoot::new("primary", r"S:\studio\proj"));
    }

    #[test]
    fn test_from_yaml_str_empty_document() {
        let config: RootConfiguration =
            RootConfiguration::from_yaml_str("", "proj", OsFamily::Linux).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_from_yaml_str_malformed() {
        let result: Result<RootConfiguration, RootConfigError> =
            RootConfiguration::from_yaml_str("primary: [unclosed", "proj", OsFamily::Linux);
        assert!(matches!(result, Err(RootConfigError::Parse { .. })));
    }

    #[test]
    fn test_from_yaml_str_bad_root_entry() {
        let result: Result<RootConfiguration, RootConfigError> =
            RootConfiguration::from_yaml_str("primary: 42", "proj", OsFamily::Linux);
        assert!(matches!(result, Err(RootConfigError::Parse { .. })));
    }

    #[test]
    fn test_from_yaml_str_non_string_name() {
        let result: Result<RootConfiguration, RootConfigError> = RootConfiguration::from_yaml_str(
            "1:\n  linux_path: /mnt/a\n",
            "proj",
            OsFamily::Linux,
        );
        assert!(matches!(result, Err(RootConfigError::InvalidRoot { .. })));
    }

    #[test]
    fn test_load_reads_roots_file() {
        let temp_dir: TempDir = TempDir::new().unwrap();
        let project_root: PathBuf = temp_dir.path().join("proj");
        let core_dir: PathBuf = config_core_dir(&project_root);
        fs::create_dir_all(&core_dir).unwrap();
        fs::write(core_dir.join(ROOTS_FILE), ROOTS_YAML).unwrap();

        let config: RootConfiguration =
            RootConfiguration::load_for_os(&project_root, OsFamily::Macos).unwrap();
        assert_eq!(
            config.get("renders"),
            Some(&StorageRoot::new("renders", "/Volumes/renders/proj"))
        );
    }

    #[test]
    fn test_load_without_roots_file_uses_project_root() {
        let temp_dir: TempDir = TempDir::new().unwrap();
        let project_root: PathBuf = temp_dir.path().join("proj");

        let config: RootConfiguration =
            RootConfiguration::load_for_os(&project_root, OsFamily::Linux).unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config.roots[0].name, PRIMARY_ROOT_NAME);
        assert_eq!(
            config.roots[0].absolute_path,
            project_root.to_string_lossy().into_owned()
        );
    }

    #[test]
    fn test_load_reports_file_path_on_parse_error() {
        let temp_dir: TempDir = TempDir::new().unwrap();
        let project_root: PathBuf = temp_dir.path().join("proj");
        let core_dir: PathBuf = config_core_dir(&project_root);
        fs::create_dir_all(&core_dir).unwrap();
        fs::write(core_dir.join(ROOTS_FILE), "primary: [").unwrap();

        match RootConfiguration::load_for_os(&project_root, OsFamily::Linux) {
            Err(RootConfigError::Parse { path, .. }) => {
                assert!(path.ends_with(ROOTS_FILE));
                assert!(path.contains("proj"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_os_family_is_posix() {
        assert!(!OsFamily::Windows.is_posix());
        assert!(OsFamily::Linux.is_posix());
        assert!(OsFamily::Macos.is_posix());
    }
}
