//! Plugin configuration.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{error::ErrorContext, TmpRepoResult};

/// Plugin configuration, read from a TOML file. Every field has a default,
/// so a missing file is not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Policy applied to descriptors fetched from remote sources. Repository
    /// level is the default because a remote descriptor is the least trusted
    /// input this plugin handles.
    pub remote_gpgcheck: String,

    /// Policy applied to descriptors from local files and directories.
    pub local_gpgcheck: String,

    /// Keep generated working directories by default, as if
    /// `--tmprepo-keep-created` were always passed.
    pub keep_created: bool,

    /// Host cache root; generated repositories get `<cache_dir>/<id>`.
    /// Default: $XDG_CACHE_HOME/tmprepo
    pub cache_dir: Option<PathBuf>,

    /// Metadata-generation tool invoked for directory sources.
    pub createrepo_command: String,

    /// Upper bound for remote descriptor retrieval, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            remote_gpgcheck: "repo".to_string(),
            local_gpgcheck: "packages".to_string(),
            keep_created: false,
            cache_dir: None,
            createrepo_command: "createrepo".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl PluginConfig {
    /// Loads configuration from `path`, or from the default location when no
    /// path is given. A missing file yields the defaults; a malformed one is
    /// fatal at startup.
    pub fn load(path: Option<&Path>) -> TmpRepoResult<Self> {
        let path = path.map_or_else(default_config_path, Path::to_path_buf);
        if !path.exists() {
            debug!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| xdg_cache_home().join("tmprepo"))
    }
}

pub fn default_config_path() -> PathBuf {
    xdg_config_home().join("tmprepo").join("config.toml")
}

fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

fn xdg_cache_home() -> PathBuf {
    env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".cache"))
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}
