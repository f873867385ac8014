//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "tvr.db";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_folder())
}

/// Ensure the data folder exists and return the database path inside it
pub fn ensure_data_folder(data_folder: &PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(data_folder)?;
    Ok(data_folder.join(DATABASE_FILE))
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/tvr/config.toml first, then /etc/tvr/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("tvr").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/tvr/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("tvr").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("tvr"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tvr"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("tvr"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tvr"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tvr"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tvr"))
    } else {
        PathBuf::from("./tvr_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_wins() {
        let folder = resolve_data_folder(Some("/tmp/tvr-cli"), "TVR_TEST_UNSET_VAR").unwrap();
        assert_eq!(folder, PathBuf::from("/tmp/tvr-cli"));
    }

    #[test]
    fn test_env_var_used_when_no_cli_arg() {
        std::env::set_var("TVR_TEST_DATA_FOLDER", "/tmp/tvr-env");
        let folder = resolve_data_folder(None, "TVR_TEST_DATA_FOLDER").unwrap();
        assert_eq!(folder, PathBuf::from("/tmp/tvr-env"));
        std::env::remove_var("TVR_TEST_DATA_FOLDER");
    }

    #[test]
    fn test_ensure_data_folder_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let data_folder = tmp.path().join("nested").join("tvr");
        let db_path = ensure_data_folder(&data_folder).unwrap();

        assert!(data_folder.exists());
        assert_eq!(db_path, data_folder.join(DATABASE_FILE));
    }
}
