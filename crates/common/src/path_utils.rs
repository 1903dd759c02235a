//! Path normalization utilities for path cache computation.
//!
//! Paths handed to the pipeline come from DCC applications that may use
//! either separator regardless of the host OS, so all matching here works on
//! slash-normalized strings rather than on `Path` components.

use std::path::{Path, PathBuf};

use crate::constants::CONFIG_CORE_DIR;
use crate::error::PathError;

/// Replace every backslash with a forward slash.
///
/// # Arguments
/// * `path` - Path string in any separator style
///
/// # Returns
/// The same path using `/` as its only separator.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Trim trailing `/` separators.
///
/// Filesystem roots keep their separator: a bare `/` and drive roots such
/// as `C:/` are returned intact.
///
/// # Arguments
/// * `path` - Slash-normalized path
pub fn trim_trailing_separators(path: &str) -> &str {
    let trimmed: &str = path.trim_end_matches('/');
    if trimmed.len() == path.len() {
        return trimmed;
    }
    if trimmed.is_empty() || is_drive_prefix(trimmed) {
        &path[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// `true` for a bare drive prefix like `C:`.
fn is_drive_prefix(path: &str) -> bool {
    let bytes: &[u8] = path.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Strip `root` from the front of `path`, comparing ASCII case-insensitively.
///
/// This is a plain string prefix test: `/studio/proj` also matches
/// `/studio/project2/file.ma`.
///
/// # Arguments
/// * `path` - Slash-normalized path to test
/// * `root` - Slash-normalized root without trailing separators
///
/// # Returns
/// The remainder of `path` after the root, or `None` if `path` does not
/// start with `root`.
pub fn strip_root_ignore_case<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if root.is_empty() || path.len() < root.len() || !path.is_char_boundary(root.len()) {
        return None;
    }

    let (head, rest): (&str, &'a str) = path.split_at(root.len());
    head.eq_ignore_ascii_case(root).then_some(rest)
}

/// Byte offset at which a path cache starts for paths under `root`.
///
/// The cache keeps the root's own directory name, so the offset skips the
/// root's parent directory and the separator that follows it.
///
/// # Arguments
/// * `root` - Slash-normalized root without trailing separators
pub fn path_cache_offset(root: &str) -> usize {
    match root.rfind('/') {
        Some(index) => index + 1,
        None => 0,
    }
}

/// Last component of a slash-normalized path.
///
/// # Arguments
/// * `path` - Path in either separator style
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Core configuration directory below a project or studio root.
///
/// # Arguments
/// * `base` - Project or studio root directory
pub fn config_core_dir(base: &Path) -> PathBuf {
    let mut dir: PathBuf = base.to_path_buf();
    for component in CONFIG_CORE_DIR {
        dir.push(component);
    }
    dir
}

/// Read a configuration file into a string.
///
/// # Arguments
/// * `path` - File to read
///
/// # Errors
/// Returns [`PathError::NotFound`] if the file does not exist, or
/// [`PathError::IoError`] for any other read failure.
pub fn read_config_file(path: &Path) -> Result<String, PathError> {
    std::fs::read_to_string(path).map_err(|e| PathError::from_io(path.display().to_string(), e))
}
