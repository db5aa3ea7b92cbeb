//! Secretscan plugins - discovery and registry of secret-detecting plugins
//!
//! Finds detector plugin modules in the built-in plugin directory and in
//! user-supplied paths, keeps the concrete detector classes, and indexes
//! them by class name and by the secret type they declare.
//!
//! ```rust,ignore
//! use secretscan_plugins::{Config, PluginRegistry};
//!
//! let config = Config::load()?;
//! let registry = PluginRegistry::from_config(&config);
//! let index = registry.secret_type_index(&config.custom_plugin_paths)?;
//! ```

pub mod config;
pub mod error;
pub mod plugins;

pub use config::Config;
pub use error::{Error, Result};
pub use plugins::{PluginClass, PluginMap, PluginPathSet, PluginRegistry, SecretPlugin, SecretTypeIndex};
