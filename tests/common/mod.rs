//! Shared test utilities

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use secretscan_plugins::plugins::{BuiltinPluginDir, ModuleLoader, ModuleNamespace, TomlModuleLoader};
use secretscan_plugins::{PluginRegistry, Result};
use tempfile::TempDir;

/// Source of a module defining one concrete detector class
#[must_use]
pub fn detector(class_name: &str, secret_type: &str) -> String {
    format!("[{class_name}]\nextends = \"BasePlugin\"\nsecret_type = \"{secret_type}\"\n")
}

/// Module loader that counts how many modules it has loaded
#[derive(Clone, Default)]
pub struct CountingLoader(Arc<AtomicUsize>);

impl CountingLoader {
    /// Modules loaded so far
    #[must_use]
    pub fn loads(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ModuleLoader for CountingLoader {
    fn load(&self, path: &Path, module_id: &str) -> Result<ModuleNamespace> {
        self.0.fetch_add(1, Ordering::SeqCst);
        TomlModuleLoader.load(path, module_id)
    }
}

/// Temporary project root with a built-in plugin directory
pub struct Fixture {
    root: TempDir,
    builtin: BuiltinPluginDir,
}

impl Fixture {
    /// Create an empty built-in plugin directory
    #[must_use]
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let builtin = BuiltinPluginDir::under_root(root.path());
        std::fs::create_dir_all(builtin.path()).expect("failed to create builtin dir");
        Self { root, builtin }
    }

    /// Write a file into the built-in plugin directory
    pub fn builtin_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.builtin.path().join(name);
        std::fs::write(&path, content).expect("failed to write builtin plugin");
        path
    }

    /// Create a custom plugin directory under the root
    pub fn custom_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        std::fs::create_dir_all(&dir).expect("failed to create custom dir");
        dir
    }

    /// Write a file anywhere under the root
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, content).expect("failed to write plugin file");
        path
    }

    /// Registry over this fixture with a counting loader
    #[must_use]
    pub fn registry(&self) -> (PluginRegistry, CountingLoader) {
        let loader = CountingLoader::default();
        let registry = PluginRegistry::with_loader(self.builtin.clone(), loader.clone());
        (registry, loader)
    }
}
