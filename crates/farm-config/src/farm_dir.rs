//! Discovery of the `.farm/` directory.
//!
//! `.farm/` holds a farm's database and `config.yaml`. Commands find it by
//! walking up from the working directory, the way `git` finds `.git/`.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Name of the metadata directory.
pub const FARM_DIR_NAME: &str = ".farm";

/// Environment variable that overrides discovery.
pub const FARM_DIR_ENV: &str = "FARM_DIR";

/// Walks up from `start` looking for `.farm/`.
///
/// `FARM_DIR` wins when it names an existing directory. Returns `None` once
/// the filesystem root is reached.
///
/// ```no_run
/// use farm_config::farm_dir::find_farm_dir;
/// use std::path::Path;
///
/// if let Some(dir) = find_farm_dir(Path::new(".")) {
///     println!("farm data in {}", dir.display());
/// }
/// ```
pub fn find_farm_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(FARM_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(FARM_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_farm_dir`], failing with [`ConfigError::FarmDirNotFound`].
pub fn find_farm_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_farm_dir(start).ok_or(ConfigError::FarmDirNotFound)
}

/// Creates `.farm/` under `path` (or `path` itself when it is already named
/// `.farm`) and returns it.
pub fn ensure_farm_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let farm_dir = if path.ends_with(FARM_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(FARM_DIR_NAME)
    };
    std::fs::create_dir_all(&farm_dir)?;
    Ok(farm_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dir_from_nested_child() {
        let dir = tempfile::tempdir().unwrap();
        let farm = dir.path().join(FARM_DIR_NAME);
        std::fs::create_dir(&farm).unwrap();
        let child = dir.path().join("records").join("2024");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_farm_dir(&child).unwrap().canonicalize().unwrap();
        assert_eq!(found, farm.canonicalize().unwrap());
        assert!(find_farm_dir_or_error(&child).is_ok());
    }

    #[test]
    fn ensure_creates_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_farm_dir(dir.path()).unwrap();
        assert!(first.is_dir());
        assert!(first.ends_with(FARM_DIR_NAME));
        assert_eq!(ensure_farm_dir(dir.path()).unwrap(), first);
        assert_eq!(ensure_farm_dir(&first).unwrap(), first);
    }
}
