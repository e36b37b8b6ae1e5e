//! Configuration loading and root folder resolution

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "KANJIDEX_ROOT";

/// Default HTTP port for kanjidex-api
pub const DEFAULT_PORT: u16 = 8607;

/// Default bind address for kanjidex-api
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Optional settings loaded from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Root folder holding the database file
    pub root_folder: Option<PathBuf>,
    /// Bind address for the HTTP listener
    pub bind: Option<String>,
    /// Port for the HTTP listener
    pub port: Option<u16>,
    /// Frontend origin allowed by CORS; absent means permissive
    pub cors_origin: Option<String>,
}

/// Resolve the root folder following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. `KANJIDEX_ROOT` environment variable
/// 3. TOML config file `root_folder` key
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, file_config: &Config) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &file_config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Load the config file from the platform config directory, if present.
///
/// Linux also checks /etc/kanjidex/config.toml after the per-user path.
pub fn load_config_file() -> Option<Config> {
    for path in candidate_config_paths() {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            match toml::from_str::<Config>(&contents) {
                Ok(config) => return Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring unparseable config file {}: {}", path.display(), e);
                }
            }
        }
    }
    None
}

fn candidate_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("kanjidex").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/kanjidex/config.toml"));
    }
    paths
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("kanjidex"))
        .unwrap_or_else(|| PathBuf::from("./kanjidex_data"))
}

/// Database file location inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("kanjidex.db")
}
