use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

pub const DEFAULT_OUTPUT_DIR: &str = "cms_hospitals_data";
pub const DEFAULT_CATALOG_URL: &str =
    "https://data.cms.gov/provider-data/api/1/metastore/schemas/dataset/items";
pub const DEFAULT_THEME: &str = "Hospitals";

/// On-disk configuration, all fields optional.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub output_dir: Utf8PathBuf,
    pub catalog_url: String,
    pub theme: String,
    pub workers: usize,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read the optional config file and fill in defaults. A missing default
    /// file just yields the defaults; an explicitly named file must exist
    /// and parse.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, SyncError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("cms-sync.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(Self::resolve_config(Config::default()));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| SyncError::ConfigRead(config_path.clone()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|err| SyncError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        ResolvedConfig {
            output_dir: Utf8PathBuf::from(
                config
                    .output_dir
                    .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            catalog_url: config
                .catalog_url
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            theme: config.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
            workers: config
                .workers
                .filter(|count| *count > 0)
                .unwrap_or_else(num_cpus::get),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default());
        assert_eq!(resolved.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(resolved.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(resolved.theme, DEFAULT_THEME);
        assert!(resolved.workers >= 1);
    }

    #[test]
    fn resolve_config_overrides() {
        let config = Config {
            output_dir: Some("mirror".to_string()),
            catalog_url: Some("http://localhost:8080/items".to_string()),
            theme: Some("Nursing Homes".to_string()),
            workers: Some(2),
        };
        let resolved = ConfigLoader::resolve_config(config);
        assert_eq!(resolved.output_dir, "mirror");
        assert_eq!(resolved.catalog_url, "http://localhost:8080/items");
        assert_eq!(resolved.theme, "Nursing Homes");
        assert_eq!(resolved.workers, 2);
    }

    #[test]
    fn zero_workers_falls_back_to_cpu_count() {
        let config = Config {
            workers: Some(0),
            ..Config::default()
        };
        let resolved = ConfigLoader::resolve_config(config);
        assert!(resolved.workers >= 1);
    }
}
