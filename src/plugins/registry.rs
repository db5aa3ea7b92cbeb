//! Plugin registry - memoized plugin and secret-type lookups
//!
//! The registry is built once per configuration and handed to whatever needs
//! plugins. Results are cached per custom path set for the lifetime of the
//! registry; failures are never cached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::capability::PluginClass;
use super::discovery::BuiltinPluginDir;
use super::loader::{PluginMap, SecretTypeIndex, import_plugins, secret_type_index};
use super::module::{ModuleLoader, TomlModuleLoader};
use super::paths::PluginPathSet;
use crate::config::Config;
use crate::Result;

/// Registry of secret-detecting plugins
///
/// Thread-safe. Each cache holds its lock across a miss, so a given path set
/// is scanned and loaded at most once even with concurrent first callers.
pub struct PluginRegistry {
    builtin: BuiltinPluginDir,
    loader: Box<dyn ModuleLoader>,
    plugins: Mutex<HashMap<PluginPathSet, Arc<PluginMap>>>,
    secret_types: Mutex<HashMap<PluginPathSet, Arc<SecretTypeIndex>>>,
}

impl PluginRegistry {
    /// Create a registry loading TOML plugin modules
    #[must_use]
    pub fn new(builtin: BuiltinPluginDir) -> Self {
        Self::with_loader(builtin, TomlModuleLoader)
    }

    /// Create a registry with a custom module loader
    #[must_use]
    pub fn with_loader(builtin: BuiltinPluginDir, loader: impl ModuleLoader + 'static) -> Self {
        Self {
            builtin,
            loader: Box::new(loader),
            plugins: Mutex::new(HashMap::new()),
            secret_types: Mutex::new(HashMap::new()),
        }
    }

    /// Create a registry for the built-in directory under the configured root
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(BuiltinPluginDir::under_root(&config.root_dir))
    }

    /// The built-in plugin directory
    #[must_use]
    pub const fn builtin(&self) -> &BuiltinPluginDir {
        &self.builtin
    }

    /// Concrete plugin classes keyed by class name
    ///
    /// Computed on first request for a given (ordered) path set and served
    /// from cache afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Import`] if any plugin module fails to load;
    /// the next call retries the scan
    pub fn import_plugins<I, P>(&self, custom_paths: I) -> Result<Arc<PluginMap>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.plugins_for(&PluginPathSet::normalize(custom_paths))
    }

    /// Class names keyed by the secret type they declare
    ///
    /// Cached independently of [`Self::import_plugins`], which it builds on.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugins for the path set cannot be imported
    pub fn secret_type_index<I, P>(&self, custom_paths: I) -> Result<Arc<SecretTypeIndex>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.secret_types_for(&PluginPathSet::normalize(custom_paths))
    }

    /// Find the plugin class that detects `secret_type`
    ///
    /// # Errors
    ///
    /// Returns an error if the plugins for the path set cannot be imported
    pub fn class_for_secret_type<I, P>(
        &self,
        custom_paths: I,
        secret_type: &str,
    ) -> Result<Option<Arc<PluginClass>>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let key = PluginPathSet::normalize(custom_paths);
        let index = self.secret_types_for(&key)?;
        let Some(class_name) = index.get(secret_type) else {
            return Ok(None);
        };
        Ok(self.plugins_for(&key)?.get(class_name).cloned())
    }

    fn plugins_for(&self, key: &PluginPathSet) -> Result<Arc<PluginMap>> {
        let mut cache = self.plugins.lock();
        if let Some(plugins) = cache.get(key) {
            return Ok(Arc::clone(plugins));
        }

        let plugins = Arc::new(import_plugins(self.loader.as_ref(), &self.builtin, key)?);
        cache.insert(key.clone(), Arc::clone(&plugins));
        Ok(plugins)
    }

    fn secret_types_for(&self, key: &PluginPathSet) -> Result<Arc<SecretTypeIndex>> {
        let mut cache = self.secret_types.lock();
        if let Some(index) = cache.get(key) {
            return Ok(Arc::clone(index));
        }

        let plugins = self.plugins_for(key)?;
        let index = Arc::new(secret_type_index(&*plugins));
        cache.insert(key.clone(), Arc::clone(&index));
        Ok(index)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("builtin", &self.builtin)
            .field("cached_path_sets", &self.plugins.lock().len())
            .finish_non_exhaustive()
    }
}
