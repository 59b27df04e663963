//! porosdjango.toml configuration parsing
//!
//! All sections are optional; anything left out falls back to the pinned
//! defaults in [`super::defaults`].
//!
//! ```toml
//! [versions]
//! django = "6.0"
//! djangorestframework = "3.16.1"
//!
//! [gitignore]
//! url = "https://www.toptal.com/developers/gitignore/api/django"
//! timeout_secs = 10
//!
//! [requirements]
//! extra = ["django-cors-headers==4.7.0"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::defaults;

/// File name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "porosdjango.toml";

/// Root configuration from porosdjango.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Pinned framework versions written to requirements.txt
    pub versions: VersionsConfig,

    /// Where the default .gitignore comes from
    pub gitignore: GitignoreConfig,

    /// Additional requirement lines
    pub requirements: RequirementsConfig,
}

/// Versions from the [versions] section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionsConfig {
    pub django: String,
    pub djangorestframework: String,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            django: defaults::DJANGO_VERSION.to_string(),
            djangorestframework: defaults::DRF_VERSION.to_string(),
        }
    }
}

/// Settings from the [gitignore] section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitignoreConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for GitignoreConfig {
    fn default() -> Self {
        Self {
            url: defaults::GITIGNORE_URL.to_string(),
            timeout_secs: defaults::GITIGNORE_TIMEOUT_SECS,
        }
    }
}

impl GitignoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Extra lines from the [requirements] section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequirementsConfig {
    pub extra: Vec<String>,
}

impl ToolConfig {
    /// Load configuration, honouring an explicit path first
    ///
    /// Lookup order: `explicit`, `./porosdjango.toml`, the user config
    /// directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        let local = cwd.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load_from_path(&local);
        }

        if let Some(user) = Self::user_config_path() {
            if user.is_file() {
                return Self::load_from_path(&user);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse porosdjango.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/porosdjango/config.toml` for the current user
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "porosdjango")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.versions.django.trim().is_empty() {
            bail!("versions.django cannot be empty");
        }
        if self.versions.djangorestframework.trim().is_empty() {
            bail!("versions.djangorestframework cannot be empty");
        }
        if self.gitignore.url.trim().is_empty() {
            bail!("gitignore.url cannot be empty");
        }
        if self.gitignore.timeout_secs == 0 {
            bail!("gitignore.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
