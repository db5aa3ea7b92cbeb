//! Plugin importer - load candidate modules and collect concrete plugin classes

use std::sync::Arc;

use indexmap::IndexMap;

use super::capability::{ClassTable, PluginClass, SecretPlugin, concrete_plugin};
use super::discovery::{BuiltinPluginDir, scan};
use super::module::{ModuleLoader, ModuleNamespace};
use super::paths::PluginPathSet;
use crate::{Error, Result};

/// Concrete plugin classes keyed by class name, in registration order
pub type PluginMap = IndexMap<String, Arc<PluginClass>>;

/// Class names keyed by the secret type they declare
pub type SecretTypeIndex = IndexMap<String, String>;

/// Scan, load, and validate every plugin module for a path set
///
/// Loading is all or nothing: the first module that fails to load, or that
/// defines a class whose bases are cyclic or cannot be put in a consistent
/// resolution order, aborts the import. When two modules define a class with
/// the same name, the one scanned later replaces the earlier one.
///
/// # Errors
///
/// Returns [`Error::Import`] if any candidate fails to load or has an invalid
/// class hierarchy, or an I/O error if a plugin directory cannot be listed
pub fn import_plugins(
    loader: &dyn ModuleLoader,
    builtin: &BuiltinPluginDir,
    custom_paths: &PluginPathSet,
) -> Result<PluginMap> {
    let candidates = scan(builtin, custom_paths)?;
    tracing::debug!(
        candidates = candidates.len(),
        custom_paths = custom_paths.len(),
        "scanned plugin candidates"
    );

    let modules = candidates
        .iter()
        .map(|candidate| loader.load(&candidate.path, &candidate.module_id))
        .collect::<Result<Vec<ModuleNamespace>>>()?;

    let classes = ClassTable::from_modules(&modules);
    for module in &modules {
        for (_, symbol) in module.symbols() {
            if let Some(class) = symbol.as_class() {
                classes
                    .linearize(class)
                    .map_err(|reason| Error::import(module.path(), module.module_id(), reason))?;
            }
        }
    }

    let mut plugins = PluginMap::new();
    for module in &modules {
        for (name, symbol) in module.public_symbols() {
            let Some(plugin) = concrete_plugin(name, symbol, &classes) else {
                continue;
            };

            if let Some(previous) = plugins.get(name) {
                tracing::debug!(
                    class = name,
                    previous = %previous.qualified_name,
                    replacement = %plugin.qualified_name,
                    "plugin class overridden by later module"
                );
            }
            plugins.insert(name.to_string(), Arc::new(plugin));
        }
    }

    tracing::info!(
        modules = modules.len(),
        plugins = plugins.len(),
        "imported plugins"
    );

    Ok(plugins)
}

/// Map each plugin's secret type to its class name
///
/// Later plugins win when two declare the same secret type.
#[must_use]
pub fn secret_type_index<P: SecretPlugin>(plugins: &IndexMap<String, Arc<P>>) -> SecretTypeIndex {
    plugins
        .iter()
        .map(|(name, plugin)| (plugin.secret_type().to_string(), name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::plugins::module::TomlModuleLoader;

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn builtin_with(root: &Path, files: &[(&str, &str)]) -> BuiltinPluginDir {
        let builtin = BuiltinPluginDir::under_root(root);
        std::fs::create_dir_all(builtin.path()).unwrap();
        for (name, content) in files {
            write(&builtin.path().join(name), content);
        }
        builtin
    }

    #[test]
    fn import_from_builtin_directory() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[
                (
                    "base.toml",
                    "[RegexBasedDetector]\nextends = \"BasePlugin\"\n",
                ),
                (
                    "aws.toml",
                    "[AwsKeyDetector]\nextends = \"plugins.base.RegexBasedDetector\"\nsecret_type = \"aws\"\n",
                ),
            ],
        );

        let plugins = import_plugins(&TomlModuleLoader, &builtin, &PluginPathSet::default()).unwrap();
        assert_eq!(plugins.keys().collect::<Vec<_>>(), vec!["AwsKeyDetector"]);
        assert_eq!(plugins["AwsKeyDetector"].module_id, "plugins.aws");
    }

    #[test]
    fn non_class_and_private_symbols_are_ignored() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[(
                "misc.toml",
                r#"
                secret_type = "not a class"
                PATTERNS = ["a", "b"]

                [_HiddenDetector]
                extends = "BasePlugin"
                secret_type = "hidden"

                [config]
                secret_type = "table without extends"

                [VisibleDetector]
                extends = "_HiddenDetector"
                "#,
            )],
        );

        let plugins = import_plugins(&TomlModuleLoader, &builtin, &PluginPathSet::default()).unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins["VisibleDetector"].secret_type, "hidden");
    }

    #[test]
    fn later_module_overrides_class_name() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[(
                "jwt.toml",
                "[JwtTokenDetector]\nextends = \"BasePlugin\"\nsecret_type = \"jwt\"\n",
            )],
        );
        let custom = root.path().join("custom");
        std::fs::create_dir(&custom).unwrap();
        write(
            &custom.join("jwt.toml"),
            "[JwtTokenDetector]\nextends = \"BasePlugin\"\nsecret_type = \"jwt-strict\"\n",
        );

        let plugins = import_plugins(
            &TomlModuleLoader,
            &builtin,
            &PluginPathSet::normalize([&custom]),
        )
        .unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins["JwtTokenDetector"].secret_type, "jwt-strict");
        assert_eq!(plugins["JwtTokenDetector"].source, custom.join("jwt.toml"));
    }

    #[test]
    fn broken_module_aborts_import() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[
                ("aws.toml", "[AwsKeyDetector]\nextends = \"BasePlugin\"\nsecret_type = \"aws\"\n"),
                ("broken.toml", "[[[ not toml"),
            ],
        );

        let err = import_plugins(&TomlModuleLoader, &builtin, &PluginPathSet::default()).unwrap_err();
        assert!(matches!(err, Error::Import { ref module_id, .. } if module_id == "plugins.broken"));
    }

    #[test]
    fn secret_type_collisions_keep_later_plugin() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[
                ("a.toml", "[First]\nextends = \"BasePlugin\"\nsecret_type = \"shared\"\n"),
                ("b.toml", "[Second]\nextends = \"BasePlugin\"\nsecret_type = \"shared\"\n"),
                ("c.toml", "[Third]\nextends = \"BasePlugin\"\nsecret_type = \"own\"\n"),
            ],
        );

        let plugins = import_plugins(&TomlModuleLoader, &builtin, &PluginPathSet::default()).unwrap();
        let index = secret_type_index(&plugins);
        assert_eq!(index.len(), 2);
        assert_eq!(index["shared"], "Second");
        assert_eq!(index["own"], "Third");
    }

    #[test]
    fn cyclic_hierarchy_fails_import() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[(
                "loop.toml",
                "[A]\nextends = \"B\"\nsecret_type = \"a\"\n\n[B]\nextends = [\"BasePlugin\", \"A\"]\n",
            )],
        );

        let err = import_plugins(&TomlModuleLoader, &builtin, &PluginPathSet::default()).unwrap_err();
        let Error::Import { module_id, reason, .. } = &err else {
            panic!("expected import error, got {err:?}");
        };
        assert_eq!(module_id, "plugins.loop");
        assert!(reason.contains("cyclic"), "{reason}");
    }

    #[test]
    fn inconsistent_hierarchy_fails_import() {
        let root = tempfile::tempdir().unwrap();
        let builtin = builtin_with(
            root.path(),
            &[
                ("aws.toml", "[AwsKeyDetector]\nextends = \"BasePlugin\"\nsecret_type = \"aws\"\n"),
                (
                    "strict.toml",
                    "[StrictAws]\nextends = \"AwsKeyDetector\"\n\n[Bad]\nextends = [\"AwsKeyDetector\", \"StrictAws\"]\n",
                ),
            ],
        );

        let err = import_plugins(&TomlModuleLoader, &builtin, &PluginPathSet::default()).unwrap_err();
        assert!(matches!(err, Error::Import { ref module_id, .. } if module_id == "plugins.strict"));
    }

    struct Fixed(&'static str);

    impl SecretPlugin for Fixed {
        fn secret_type(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn index_accepts_any_secret_plugin() {
        let plugins: IndexMap<String, Arc<Fixed>> = [
            ("Slack".to_string(), Arc::new(Fixed("Slack Token"))),
            ("Stripe".to_string(), Arc::new(Fixed("Stripe Key"))),
        ]
        .into_iter()
        .collect();

        let index = secret_type_index(&plugins);
        assert_eq!(index["Slack Token"], "Slack");
        assert_eq!(index["Stripe Key"], "Stripe");
    }
}
