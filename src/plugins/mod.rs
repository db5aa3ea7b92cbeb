//! Plugin system for secretscan
//!
//! Detector plugins are TOML modules found in the built-in `plugins/`
//! directory and in user-supplied custom paths. Each module may define
//! classes; those descending from the `BasePlugin` capability that resolve a
//! `secret_type` are registered by class name and indexed by secret type.

pub mod capability;
pub mod discovery;
pub mod loader;
pub mod manifest;
pub mod module;
pub mod paths;
pub mod registry;

pub use capability::{ClassTable, PluginClass, SecretPlugin, concrete_plugin, is_concrete_plugin};
pub use discovery::{BuiltinPluginDir, PluginCandidate, module_id_for, scan};
pub use loader::{PluginMap, SecretTypeIndex, import_plugins, secret_type_index};
pub use manifest::{ClassDef, Symbol};
pub use module::{ModuleLoader, ModuleNamespace, TomlModuleLoader};
pub use paths::PluginPathSet;
pub use registry::PluginRegistry;
