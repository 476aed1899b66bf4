//! Configuration loading from TOML files

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use plannet_core::{FHIR_JSON, HttpConfig, OnError};
use plannet_directory::config::DEFAULT_BASE_URL;

/// Global configuration for plannet
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpSettings,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// `Accept` header for every request; empty sends none
    pub accept: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept: FHIR_JSON.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Whole-request timeout, 0 disables it
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            connect_timeout_secs: 30,
        }
    }
}

impl HttpSettings {
    pub fn to_http_config(self) -> HttpConfig {
        HttpConfig {
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub organizations_file: PathBuf,
    pub networks_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = plannet_directory::Config::default();
        Self {
            dir: defaults.output_dir,
            organizations_file: defaults.organizations_file,
            networks_file: defaults.networks_file,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub on_error: OnError,
    pub max_pages: Option<NonZeroUsize>,
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./plannet.toml (current directory)
    /// 2. ~/.config/plannet/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("plannet.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "plannet") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Pipeline settings for the export crate
    pub fn directory_config(&self) -> plannet_directory::Config {
        plannet_directory::Config {
            base_url: self.api.base_url.clone(),
            accept: self.api.accept.clone(),
            output_dir: self.output.dir.clone(),
            organizations_file: self.output.organizations_file.clone(),
            networks_file: self.output.networks_file.clone(),
            on_error: self.pipeline.on_error,
            max_pages: self.pipeline.max_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.accept, "application/fhir+json");
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert_eq!(config.pipeline.on_error, OnError::Partial);
        assert!(config.pipeline.max_pages.is_none());
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[api]
base_url = "https://directory.example.org/fhir/"

[output]
dir = "/tmp/exports"
networks_file = "networks.csv"

[pipeline]
on_error = "abort"
max_pages = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://directory.example.org/fhir/");
        assert_eq!(config.api.accept, FHIR_JSON);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/exports"));
        assert_eq!(
            config.output.organizations_file,
            PathBuf::from("organization_ids.csv")
        );
        assert_eq!(config.pipeline.on_error, OnError::Abort);
        assert_eq!(config.pipeline.max_pages, NonZeroUsize::new(5));

        let directory = config.directory_config();
        assert_eq!(
            directory.networks_path(),
            PathBuf::from("/tmp/exports/networks.csv")
        );
    }

    #[test]
    fn unknown_policy_rejected() {
        let err = toml::from_str::<Config>("[pipeline]\non_error = \"retry\"\n").unwrap_err();
        assert!(err.to_string().contains("retry"));
    }

    #[test]
    fn zero_page_limit_rejected() {
        assert!(toml::from_str::<Config>("[pipeline]\nmax_pages = 0\n").is_err());
    }

    #[test]
    fn zero_timeout_disables_it() {
        let http = HttpSettings {
            timeout_secs: 0,
            connect_timeout_secs: 5,
        };
        let config = http.to_http_config();
        assert!(config.timeout.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plannet.toml");
        std::fs::write(&path, "[api\nbroken").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
