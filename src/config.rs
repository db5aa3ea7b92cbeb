//! Configuration management for secretscan plugins

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Config file name looked up in the user's config directory
pub const CONFIG_FILE_NAME: &str = "secretscan.toml";

/// Plugin discovery configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project root containing the built-in `plugins/` directory
    pub root_dir: PathBuf,

    /// Additional plugin files and directories, in scan order
    pub custom_plugin_paths: Vec<PathBuf>,
}

/// On-disk layout of `secretscan.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    root_dir: Option<PathBuf>,
    plugins: PluginsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PluginsSection {
    custom_paths: Vec<PathBuf>,
}

/// Project root used to locate the built-in plugin directory
///
/// `SECRETSCAN_ROOT` overrides the default, which is the directory this
/// crate was built from (where the built-in plugins ship).
#[must_use]
pub fn root_directory() -> PathBuf {
    std::env::var_os("SECRETSCAN_ROOT")
        .map_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")), PathBuf::from)
}

/// Default location of the user config file
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "secretscan", "secretscan")
        .map(|d| d.config_dir().join(CONFIG_FILE_NAME))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: root_directory(),
            custom_plugin_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default locations
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_with_options(None)
    }

    /// Load configuration, optionally from an explicit config file
    ///
    /// Priority: config file (explicit, else the user config directory), then
    /// `SECRETSCAN_CUSTOM_PLUGINS` appended to the file's custom paths, then
    /// defaults. `SECRETSCAN_ROOT` always wins for the root directory.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file is missing, or if any config
    /// file cannot be read or parsed
    pub fn load_with_options(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) if !path.exists() => {
                return Err(Error::NotFound(format!(
                    "config file {}",
                    path.display()
                )));
            }
            Some(path) => Self::read_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::read_file(&path)?,
                None => ConfigFile::default(),
            },
        };

        let root_dir = match (std::env::var_os("SECRETSCAN_ROOT"), file.root_dir) {
            (Some(env_root), _) => PathBuf::from(env_root),
            (None, Some(file_root)) => file_root,
            (None, None) => root_directory(),
        };

        let mut custom_plugin_paths = file.plugins.custom_paths;
        if let Some(paths) = std::env::var_os("SECRETSCAN_CUSTOM_PLUGINS") {
            custom_plugin_paths.extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }

        Ok(Self {
            root_dir,
            custom_plugin_paths,
        })
    }

    /// Read and parse a config file
    fn read_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(file)
    }

    /// Append custom plugin paths, keeping their order
    #[must_use]
    pub fn with_custom_plugin_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.custom_plugin_paths.extend(paths);
        self
    }
}
