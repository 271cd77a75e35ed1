use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Where wg-quick keeps its configs
pub const DEFAULT_CONFIG_DIR: &str = "/etc/wireguard";

const CONFIG_EXTENSION: &str = "conf";

/// Resolve the config file to load.
///
/// With `file_name`, it is joined onto `path` (an absolute file name wins).
/// Without one, `path` is used directly if it is a file, or searched for the
/// first `*.conf` file (by name) if it is a directory.
pub fn locate_config(path: &Path, file_name: Option<&str>) -> Result<PathBuf> {
    if let Some(file_name) = file_name {
        let candidate = path.join(file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
        return Err(ConfigError::NoConfigFound(candidate).into());
    }

    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    if !path.is_dir() {
        return Err(ConfigError::NoConfigFound(path.to_path_buf()).into());
    }

    let mut configs: Vec<PathBuf> = fs::read_dir(path)
        .map_err(ConfigError::File)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == CONFIG_EXTENSION))
        .collect();
    configs.sort();

    if configs.len() > 1 {
        tracing::debug!(
            "{} configs in {}, using the first",
            configs.len(),
            path.display()
        );
    }

    configs
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::NoConfigFound(path.to_path_buf()).into())
}
