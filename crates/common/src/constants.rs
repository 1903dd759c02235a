//! Shared constants used across publish-resolver crates.

/// Root name reserved for the project's main storage.
pub const PRIMARY_ROOT_NAME: &str = "primary";

/// Name under which the `primary` root is known to the registry.
pub const PRIMARY_STORAGE_ALIAS: &str = "Tank";

/// Pipeline configuration directory, relative to a project or studio root.
pub const CONFIG_CORE_DIR: [&str; 3] = ["tank", "config", "core"];

/// Storage roots file inside the project's core configuration directory.
pub const ROOTS_FILE: &str = "roots.yml";

/// Registry connection file inside the studio's core configuration directory.
pub const SHOTGUN_CONFIG_FILE: &str = "shotgun.yml";

/// App store connection file inside the studio's core configuration directory.
pub const APP_STORE_CONFIG_FILE: &str = "app_store.yml";

/// Map a root name to the storage name used in registry queries.
pub fn storage_name_for_root(root_name: &str) -> &str {
    if root_name == PRIMARY_ROOT_NAME {
        PRIMARY_STORAGE_ALIAS
    } else {
        root_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_name_for_primary() {
        assert_eq!(storage_name_for_root("primary"), "Tank");
    }

    #[test]
    fn test_storage_name_for_other_roots() {
        assert_eq!(storage_name_for_root("renders"), "renders");
        // Only the exact lowercase name is aliased
        assert_eq!(storage_name_for_root("Primary"), "Primary");
    }
}
