use std::fs;
use std::path::{Path, PathBuf};

/// Name of the data directory created by `mf init`
pub const DATA_DIR_NAME: &str = ".mindflow";

/// Environment variable naming the data directory directly
pub const DATA_DIR_ENV: &str = "MINDFLOW_DIR";

/// Error type for data directory discovery and setup
#[derive(Debug, thiserror::Error)]
pub enum DirError {
    #[error("no .mindflow/ directory found (run `mf init` first)")]
    NotInitialized,
    #[error("{0} does not exist")]
    Missing(PathBuf),
    #[error("{0} already exists (use --force to rewrite its config)")]
    AlreadyInitialized(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` to the first directory containing `.mindflow/`,
/// returning the `.mindflow/` path.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, DirError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(DirError::NotInitialized);
        }
    }
}

/// Pick the data directory: an explicit root (`-C`) wins, then
/// `MINDFLOW_DIR`, then discovery from `cwd`.
pub fn resolve_data_dir(
    root_override: Option<&Path>,
    env_dir: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, DirError> {
    if let Some(root) = root_override {
        let dir = root.join(DATA_DIR_NAME);
        return if dir.is_dir() {
            Ok(dir)
        } else {
            Err(DirError::NotInitialized)
        };
    }
    if let Some(dir) = env_dir {
        return if dir.is_dir() {
            Ok(dir.to_path_buf())
        } else {
            Err(DirError::Missing(dir.to_path_buf()))
        };
    }
    discover_data_dir(cwd)
}

/// Create `<root>/.mindflow/` with a config file. Existing snapshots are
/// never touched; with `force` the config is rewritten.
pub fn init_data_dir(root: &Path, config_template: &str, force: bool) -> Result<PathBuf, DirError> {
    let dir = root.join(DATA_DIR_NAME);
    if dir.is_dir() && !force {
        return Err(DirError::AlreadyInitialized(dir));
    }
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(crate::io::config_io::CONFIG_FILE), config_template)?;
    Ok(dir)
}
