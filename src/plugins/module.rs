//! Module loading - turn a plugin source file into a namespace of symbols

use std::path::{Path, PathBuf};

use super::manifest::Symbol;
use crate::{Error, Result};

/// Prefix marking private symbols and reserved module files
pub const PRIVATE_PREFIX: char = '_';

/// Loader boundary for plugin source files
///
/// Implementations load the file at `path` once, bound to `module_id`, and
/// return every top-level definition it produces.
pub trait ModuleLoader: Send + Sync {
    /// Load a single plugin module
    ///
    /// # Errors
    ///
    /// Returns [`Error::Import`] if the file cannot be read or evaluated
    fn load(&self, path: &Path, module_id: &str) -> Result<ModuleNamespace>;
}

/// Top-level symbols produced by loading one module
#[derive(Debug, Clone)]
pub struct ModuleNamespace {
    module_id: String,
    path: PathBuf,
    symbols: Vec<(String, Symbol)>,
}

impl ModuleNamespace {
    /// Create a namespace from already-evaluated symbols
    #[must_use]
    pub fn new(module_id: impl Into<String>, path: impl Into<PathBuf>, symbols: Vec<(String, Symbol)>) -> Self {
        Self {
            module_id: module_id.into(),
            path: path.into(),
            symbols,
        }
    }

    /// Identifier the module was bound to
    #[must_use]
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// File the module was loaded from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All symbols, private ones included, in enumeration order
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }

    /// Symbols whose names do not start with the private marker
    pub fn public_symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols().filter(|(name, _)| !name.starts_with(PRIVATE_PREFIX))
    }

    /// Number of symbols, private ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the module defines nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Loads `*.toml` plugin modules from disk
///
/// Symbols enumerate in name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlModuleLoader;

impl ModuleLoader for TomlModuleLoader {
    fn load(&self, path: &Path, module_id: &str) -> Result<ModuleNamespace> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::import(path, module_id, e))?;
        let document: toml::Table =
            toml::from_str(&content).map_err(|e| Error::import(path, module_id, e))?;

        let symbols = document
            .into_iter()
            .map(|(name, value)| {
                Symbol::parse(&name, value, module_id, path)
                    .map(|symbol| (name, symbol))
                    .map_err(|reason| Error::import(path, module_id, reason))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            module_id,
            path = %path.display(),
            symbols = symbols.len(),
            "loaded plugin module"
        );

        Ok(ModuleNamespace::new(module_id, path, symbols))
    }
}
