//! Plugin discovery - enumerate the plugin modules to load

use std::path::{Path, PathBuf};

use super::module::PRIVATE_PREFIX;
use super::paths::PluginPathSet;
use crate::Result;

/// Extension recognized as plugin source
pub const PLUGIN_EXTENSION: &str = "toml";

/// Location of the built-in plugin directory relative to the project root
pub const BUILTIN_PLUGIN_DIR: &str = "plugins";

/// A plugin module queued for loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCandidate {
    /// File to load
    pub path: PathBuf,
    /// Dotted module identifier derived from the path
    pub module_id: String,
}

impl PluginCandidate {
    fn new(path: PathBuf, id_path: &Path) -> Self {
        Self {
            module_id: module_id_for(id_path),
            path,
        }
    }
}

/// The built-in plugin directory
///
/// Module identifiers for built-in plugins are derived from the canonical
/// relative location rather than the resolved path, so they do not depend on
/// where the project is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinPluginDir {
    path: PathBuf,
    canonical: PathBuf,
}

impl BuiltinPluginDir {
    /// Built-in directory under a project root
    #[must_use]
    pub fn under_root(root: &Path) -> Self {
        Self {
            path: root.join(BUILTIN_PLUGIN_DIR),
            canonical: PathBuf::from(BUILTIN_PLUGIN_DIR),
        }
    }

    /// Resolved location on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Derive a dotted module identifier from a source path
///
/// The extension is stripped and path separators become dots:
/// `custom/plugins/aws.toml` becomes `custom.plugins.aws`.
#[must_use]
pub fn module_id_for(path: &Path) -> String {
    path.with_extension("")
        .to_string_lossy()
        .chars()
        .map(|c| if std::path::is_separator(c) { '.' } else { c })
        .collect()
}

/// Enumerate plugin candidates in load order
///
/// Custom paths that are files are taken as-is. The built-in directory and
/// then every custom directory (in the given order) are listed for plugin
/// files, skipping reserved names. Paths that do not exist are ignored; a
/// missing built-in directory is logged as a warning since only custom
/// plugins can load without it.
///
/// # Errors
///
/// Returns an error if an existing directory cannot be listed
pub fn scan(builtin: &BuiltinPluginDir, custom_paths: &PluginPathSet) -> Result<Vec<PluginCandidate>> {
    let mut candidates: Vec<PluginCandidate> = custom_paths
        .iter()
        .filter(|path| path.is_file())
        .map(|path| PluginCandidate::new(path.to_path_buf(), path))
        .collect();

    if !builtin.path.is_dir() {
        tracing::warn!(
            path = %builtin.path.display(),
            "built-in plugin directory not found, only custom plugins will load"
        );
    }
    candidates.extend(scan_directory(&builtin.path, &builtin.canonical)?);

    for dir in custom_paths.iter().filter(|path| path.is_dir()) {
        candidates.extend(scan_directory(dir, dir)?);
    }

    for path in custom_paths.iter().filter(|path| !path.exists()) {
        tracing::debug!(path = %path.display(), "custom plugin path does not exist, skipping");
    }

    Ok(candidates)
}

/// List plugin files directly inside `dir`
///
/// `id_dir` is the directory used when deriving module identifiers.
fn scan_directory(dir: &Path, id_dir: &Path) -> Result<Vec<PluginCandidate>> {
    if !dir.is_dir() {
        tracing::debug!(path = %dir.display(), "plugin directory does not exist, skipping");
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };

        if !is_plugin_file_name(name) || !entry.path().is_file() {
            continue;
        }
        names.push(name.to_string());
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| PluginCandidate::new(dir.join(&name), &id_dir.join(&name)))
        .collect())
}

/// Whether a directory entry name is eligible as a plugin module
fn is_plugin_file_name(name: &str) -> bool {
    !name.starts_with(PRIVATE_PREFIX)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == PLUGIN_EXTENSION)
}
