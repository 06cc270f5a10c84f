/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration for the vendor API endpoints,
    the registry CLI, and the build folder layout.

  Security / Safety Notes:
    Client credentials are deliberately absent from the file
    format; they are supplied per invocation by the CI secret
    store.

  Dependencies:
    serde + toml for parsing, dirs for the XDG config root.

  Operational Scope:
    Read once at startup; CLI flags override file values.

  Revision History:
    2025-11-12 COD  Introduced configuration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit defaults mirrored in documentation
    - Missing default file is not an error; missing explicit
      file is
============================================================*/

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BuildError, Result};

pub const DEFAULT_TOKEN_URL: &str = "https://www.sidefx.com/oauth2/application_token";
pub const DEFAULT_ENDPOINT_URL: &str = "https://www.sidefx.com/api/";
pub const DEFAULT_SUPPORTED_VERSIONS: &[&str] = &["19.5", "20.0", "20.5", "21.0"];

const CONFIG_DIR_NAME: &str = "houdini-build";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub api: ApiConfig,
    pub registry: RegistryConfig,
    pub build: BuildLayoutConfig,
}

/// Vendor web API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub token_url: String,
    pub endpoint_url: String,
    /// Request timeout in seconds for API calls; `None` keeps the client default.
    pub timeout: Option<u64>,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            timeout: None,
            user_agent: concat!("Houdini-Build/", env!("CARGO_PKG_VERSION"), " (linux)").to_string(),
        }
    }
}

/// Container registry inspection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub command: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            command: "docker".to_string(),
        }
    }
}

/// Where build inputs live and which releases may be built.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildLayoutConfig {
    pub dockerfiles_dir: Option<PathBuf>,
    pub supported_versions: Vec<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for BuildLayoutConfig {
    fn default() -> Self {
        Self {
            dockerfiles_dir: None,
            supported_versions: DEFAULT_SUPPORTED_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect(),
            log_dir: None,
        }
    }
}

impl BuildConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. Only an explicitly requested file must exist.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load(explicit),
            None => match default_config_path() {
                Some(candidate) if candidate.is_file() => Self::load(&candidate),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            BuildError::Config(format!(
                "Failed to read config file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw).map_err(|err| match err {
            BuildError::Config(msg) => BuildError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: BuildConfig =
            toml::from_str(raw).map_err(|err| BuildError::Config(err.to_string()))?;
        if config.build.supported_versions.is_empty() {
            return Err(BuildError::Config(
                "build.supported_versions must list at least one major.minor version".into(),
            ));
        }
        Ok(config)
    }

    /// Root folder holding one `dockerfiles/{major.minor}` directory per release.
    pub fn dockerfiles_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.build.dockerfiles_dir {
            return Ok(dir.clone());
        }
        let cwd = std::env::current_dir().map_err(|err| {
            BuildError::Filesystem(format!("Failed to resolve working directory: {err}"))
        })?;
        Ok(cwd.join("dockerfiles"))
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.build.log_dir.as_deref()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|root| root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_vendor_endpoints() {
        let config = BuildConfig::default();
        assert_eq!(config.api.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.registry.command, "docker");
        assert_eq!(
            config.build.supported_versions,
            vec!["19.5", "20.0", "20.5", "21.0"]
        );
        assert!(config.api.timeout.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = BuildConfig::from_toml_str(
            r#"
            [api]
            endpoint_url = "http://localhost:9000/api/"
            timeout = 30

            [build]
            dockerfiles_dir = "/srv/dockerfiles"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.endpoint_url, "http://localhost:9000/api/");
        assert_eq!(config.api.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api.timeout, Some(30));
        assert_eq!(
            config.dockerfiles_dir().unwrap(),
            PathBuf::from("/srv/dockerfiles")
        );
        assert_eq!(config.build.supported_versions.len(), 4);
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let err = BuildConfig::from_toml_str("[build]\nsupported_versions = []\n").unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = BuildConfig::load_from_optional_path(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }
}
