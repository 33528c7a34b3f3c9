use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct ForgeConfig {
    pub store_root: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        ForgeConfig {
            store_root: None,
            log_level: Some("info".to_string()),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ForgeConfig, String> {
    match path {
        Some(config_path) => {
            if !config_path.exists() {
                return Err(format!("Config file not found: {config_path:?}"));
            }

            let config_content = match fs::read_to_string(config_path) {
                Ok(content) => content,
                Err(e) => return Err(format!("Failed to read config file: {e}")),
            };

            match serde_json::from_str(&config_content) {
                Ok(config) => {
                    debug!("Loaded configuration from {config_path:?}");
                    Ok(config)
                }
                Err(e) => Err(format!("Failed to parse config file: {e}")),
            }
        }
        None => {
            debug!("No config file provided, using default configuration");
            Ok(ForgeConfig::default())
        }
    }
}

/// The file-store directory: CLI flag first, then the config file, then the
/// `files` directory next to the working directory.
pub fn store_root(cli_store: Option<PathBuf>, config: &ForgeConfig) -> PathBuf {
    cli_store
        .or_else(|| config.store_root.clone())
        .unwrap_or_else(|| PathBuf::from("files"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_config_file() {
        let config = load_config(None).unwrap();
        assert!(config.store_root.is_none());
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/forge.json"))).is_err());
    }

    #[test]
    fn test_store_root_precedence() {
        let config = ForgeConfig {
            store_root: Some(PathBuf::from("/var/forge/files")),
            log_level: None,
        };
        assert_eq!(
            store_root(Some(PathBuf::from("/tmp/override")), &config),
            PathBuf::from("/tmp/override")
        );
        assert_eq!(store_root(None, &config), PathBuf::from("/var/forge/files"));
        assert_eq!(
            store_root(None, &ForgeConfig::default()),
            PathBuf::from("files")
        );
    }
}
