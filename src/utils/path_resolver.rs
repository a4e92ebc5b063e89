use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "motopv.toml";
pub const LOG_FOLDER_NAME: &str = "motopv_logs";
pub const CONFIG_ENV_VAR: &str = "MOTOPV_CONFIG";
pub const LOG_DIR_ENV_VAR: &str = "MOTOPV_LOG_DIR";

const MAX_WALK_UP: usize = 12;

/// Resolve deployment folder (absolute path)
pub fn resolve_deployment_folder() -> PathBuf {
    // Prefer the folder where the binary is running from
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return dir.to_path_buf();
        }
    }

    // Fallback: current working directory
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Walk up from `start` and return the first directory containing `name`.
pub fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    for _ in 0..MAX_WALK_UP {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Where the settings file came from. An explicit file must exist; a discovered one
/// is only picked up when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    Explicit(PathBuf),
    Discovered(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Explicit(p) | ConfigLocation::Discovered(p) => p,
        }
    }
}

/// Locate the settings file, if any.
///
/// Order: `$MOTOPV_CONFIG`, a `motopv.toml` in the working directory or one of its
/// parents, then `<config dir>/motopv/motopv.toml`.
pub fn resolve_config_file() -> Option<ConfigLocation> {
    let cwd = std::env::current_dir().ok();
    locate_config_file(std::env::var_os(CONFIG_ENV_VAR), cwd.as_deref())
}

fn locate_config_file(env_value: Option<OsString>, cwd: Option<&Path>) -> Option<ConfigLocation> {
    if let Some(p) = env_value.filter(|v| !v.is_empty()) {
        return Some(ConfigLocation::Explicit(PathBuf::from(p)));
    }

    if let Some(found) = cwd.and_then(|d| find_upwards(d, CONFIG_FILE_NAME)) {
        return Some(ConfigLocation::Discovered(found));
    }

    dirs::config_dir()
        .map(|d| d.join("motopv").join(CONFIG_FILE_NAME))
        .filter(|p| p.exists())
        .map(ConfigLocation::Discovered)
}

/// Resolve log folder (absolute path), creating it when needed.
pub fn resolve_log_folder() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(LOG_DIR_ENV_VAR).filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(p);
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to create log folder {:?}: {}", dir, e))?;
        return Ok(dir);
    }

    // Reuse an existing `motopv_logs/` above the working directory, or create one next to
    // the project's `motopv.toml`.
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(existing) = find_upwards(&cwd, LOG_FOLDER_NAME) {
            return Ok(existing);
        }
        if let Some(config) = find_upwards(&cwd, CONFIG_FILE_NAME) {
            if let Some(root) = config.parent() {
                let dir = root.join(LOG_FOLDER_NAME);
                std::fs::create_dir_all(&dir)
                    .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
                return Ok(dir);
            }
        }
    }

    let base = dirs::data_local_dir()
        .map(|d| d.join("motopv"))
        .unwrap_or_else(resolve_deployment_folder);
    let log_dir = base.join(LOG_FOLDER_NAME);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}
