//! Global configuration for ovc
//!
//! Located at `~/.config/ovc/config.toml`

use crate::{ConfigError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Global ovc configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OvcConfig {
    /// Environment identifier -> API host (or full base URL)
    pub environments: BTreeMap<String, String>,
    pub iyo: IyoConfig,
    pub defaults: DefaultsConfig,
}

/// itsyou.online client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IyoConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Base URL of the itsyou.online instance
    pub url: String,
    /// JWTs cached per environment
    pub tokens: BTreeMap<String, String>,
}

impl Default for IyoConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            url: "https://itsyou.online".to_string(),
            tokens: BTreeMap::new(),
        }
    }
}

/// Defaults for resources created from the shell or the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Substring of the image name new machines boot from
    pub image: String,
    /// Boot disk size in GiB
    pub disk_size: u32,
    /// Memory in MiB for `vm create`
    pub memory: u32,
    pub vcpus: u32,
    /// Public key authorized for root on new machines
    pub ssh_key: String,
    /// First public port tried when a forward gets an automatic port
    pub first_public_port: u16,
    /// Pass `-A` to ssh for console sessions
    pub forward_agent: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            image: "Ubuntu 16.04".to_string(),
            disk_size: 100,
            memory: 1024,
            vcpus: 1,
            ssh_key: "~/.ssh/id_rsa.pub".to_string(),
            first_public_port: 3500,
            forward_agent: true,
        }
    }
}

impl DefaultsConfig {
    /// SSH public key path with `~` and environment variables expanded
    pub fn ssh_key_path(&self) -> PathBuf {
        match shellexpand::full(&self.ssh_key) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                tracing::warn!("Could not expand ssh key path {}: {}", self.ssh_key, e);
                PathBuf::from(&self.ssh_key)
            }
        }
    }
}

impl OvcConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            "Loaded config from {:?}: {} environment(s)",
            path,
            config.environments.len()
        );

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "ovc").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Environment identifiers in sorted order
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Configured host for an environment
    pub fn environment_url(&self, name: &str) -> Result<&str> {
        self.environments
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))
    }

    /// Base URL for API calls: the host with `https://` prepended unless a
    /// scheme is already present
    pub fn base_url(&self, name: &str) -> Result<String> {
        let host = self.environment_url(name)?.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            Ok(host.to_string())
        } else {
            Ok(format!("https://{}", host))
        }
    }

    /// Cached JWT for an environment, if any
    pub fn cached_token(&self, environment: &str) -> Option<&str> {
        self.iyo.tokens.get(environment).map(String::as_str)
    }

    /// Remember a JWT for an environment
    pub fn store_token(&mut self, environment: &str, jwt: impl Into<String>) {
        self.iyo.tokens.insert(environment.to_string(), jwt.into());
    }

    /// Client id and secret, failing when either is missing
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let id = self
            .iyo
            .client_id
            .as_deref()
            .ok_or(ConfigError::MissingCredential("client_id"))?;
        let secret = self
            .iyo
            .client_secret
            .as_deref()
            .ok_or(ConfigError::MissingCredential("client_secret"))?;
        Ok((id, secret))
    }
}
