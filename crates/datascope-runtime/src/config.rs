use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolve the configuration directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. DATASCOPE_PATH environment variable (with tilde expansion)
/// 3. XDG data directory (recommended default)
/// 4. ~/.datascope (fallback for systems without XDG)
pub fn resolve_config_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Explicit path
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    // Priority 2: DATASCOPE_PATH environment variable
    if let Ok(env_path) = std::env::var("DATASCOPE_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    // Priority 3: XDG data directory (recommended default)
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("datascope"));
    }

    // Priority 4: Fallback to ~/.datascope (last resort for systems without XDG)
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".datascope"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

fn default_page_size() -> usize {
    100
}

/// A named service the browser can connect to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub endpoint: String,
    pub service_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default gateway endpoint when a service entry has none
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Rows per page in the data view
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub services: HashMap<String, ServiceEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            page_size: default_page_size(),
            services: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_config_dir(None)?.join("config.toml"))
    }

    pub fn service(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }

    pub fn set_service(&mut self, name: String, entry: ServiceEntry) {
        self.services.insert(name, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.page_size, 100);
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.page_size = 50;
        config.set_service(
            "warehouse".to_string(),
            ServiceEntry {
                endpoint: "http://localhost:8080".to_string(),
                service_id: 3,
            },
        );

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.page_size, 50);
        assert_eq!(loaded.service("warehouse").unwrap().service_id, 3);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.page_size, 100);

        Ok(())
    }
}
