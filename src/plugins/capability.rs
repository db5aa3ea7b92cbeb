//! Plugin capability - the detector contract and the concreteness check
//!
//! Every detector class must descend from the `BasePlugin` capability and
//! provide a `secret_type`. Classes live in different modules that are loaded
//! independently, so ancestry is established by walking base references
//! through a [`ClassTable`] and comparing qualified names, not by comparing
//! definitions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::manifest::{ClassDef, Symbol};
use super::module::ModuleNamespace;

/// Module that defines the capability base
pub const CAPABILITY_MODULE: &str = "plugins.base";

/// Name of the capability base class
pub const CAPABILITY_NAME: &str = "BasePlugin";

/// Qualified name every concrete plugin must have among its ancestors
#[must_use]
pub fn capability_qualified_name() -> String {
    format!("{CAPABILITY_MODULE}.{CAPABILITY_NAME}")
}

/// Contract shared by every secret-detecting plugin
pub trait SecretPlugin {
    /// Label of the kind of secret the plugin detects
    fn secret_type(&self) -> &str;
}

/// A validated, concrete plugin class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginClass {
    /// Class name in its module
    pub name: String,
    /// `<module_id>.<name>`
    pub qualified_name: String,
    /// Identifier of the defining module
    pub module_id: String,
    /// File the class was loaded from
    pub source: PathBuf,
    /// Qualified names of the class and its ancestors, in resolution order
    pub ancestors: Vec<String>,
    /// Resolved secret type
    pub secret_type: String,
    /// Attributes resolved along the ancestor chain, earlier classes winning
    pub attributes: toml::Table,
}

impl PluginClass {
    /// File the class was loaded from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether `qualified_name` is the class itself or one of its ancestors
    #[must_use]
    pub fn descends_from(&self, qualified_name: &str) -> bool {
        self.ancestors.iter().any(|a| a == qualified_name)
    }
}

impl SecretPlugin for PluginClass {
    fn secret_type(&self) -> &str {
        &self.secret_type
    }
}

/// Resolution environment for base class references
///
/// Seeded with the capability base; every loaded class is registered in scan
/// order before any validation happens, so bases defined in modules scanned
/// later still resolve.
#[derive(Debug, Clone)]
pub struct ClassTable {
    by_qualified_name: HashMap<String, Arc<ClassDef>>,
    /// Every class per simple name, in registration order
    by_name: HashMap<String, Vec<Arc<ClassDef>>>,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    /// Create a table containing only the capability base
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            by_qualified_name: HashMap::new(),
            by_name: HashMap::new(),
        };
        table.insert(ClassDef {
            name: CAPABILITY_NAME.to_string(),
            module_id: CAPABILITY_MODULE.to_string(),
            source: PathBuf::new(),
            bases: Vec::new(),
            secret_type: None,
            attributes: toml::Table::new(),
        });
        table
    }

    /// Build a table from loaded modules, in scan order
    #[must_use]
    pub fn from_modules<'a>(modules: impl IntoIterator<Item = &'a ModuleNamespace>) -> Self {
        let mut table = Self::new();
        for module in modules {
            for (_, symbol) in module.symbols() {
                if let Some(class) = symbol.as_class() {
                    table.insert(class.clone());
                }
            }
        }
        table
    }

    /// Register a class; a later class with the same simple name shadows earlier ones
    pub fn insert(&mut self, class: ClassDef) {
        let class = Arc::new(class);
        self.by_qualified_name
            .insert(class.qualified_name(), Arc::clone(&class));
        self.by_name.entry(class.name.clone()).or_default().push(class);
    }

    /// Number of registered classes, the capability base included
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_qualified_name.len()
    }

    /// Whether the table is empty (never true once constructed)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_qualified_name.is_empty()
    }

    /// Resolve a base reference made by `from`
    ///
    /// Tries a class of that name in the same module, then an exact qualified
    /// name, then the most recently registered class with that simple name.
    /// The referencing class never resolves to itself, so a class may extend
    /// another class of the same name that it replaces.
    #[must_use]
    pub fn resolve(&self, reference: &str, from: &ClassDef) -> Option<Arc<ClassDef>> {
        let own = from.qualified_name();
        let not_self = |class: &&Arc<ClassDef>| class.qualified_name() != own;

        self.by_qualified_name
            .get(&format!("{}.{reference}", from.module_id))
            .filter(not_self)
            .or_else(|| self.by_qualified_name.get(reference).filter(not_self))
            .or_else(|| {
                self.by_name
                    .get(reference)
                    .and_then(|classes| classes.iter().rev().find(not_self))
            })
            .cloned()
    }

    /// Resolved bases of a class, in declaration order
    ///
    /// Unresolvable references are dropped.
    fn resolve_bases(&self, class: &ClassDef) -> Vec<Arc<ClassDef>> {
        class
            .bases
            .iter()
            .filter_map(|reference| {
                let base = self.resolve(reference, class);
                if base.is_none() {
                    tracing::debug!(
                        class = %class.qualified_name(),
                        base = %reference,
                        "unresolved base class reference"
                    );
                }
                base
            })
            .collect()
    }

    /// The class followed by its ancestors in C3 resolution order
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the hierarchy is cyclic or
    /// has no consistent linearization
    pub fn linearize(&self, class: &ClassDef) -> std::result::Result<Vec<Arc<ClassDef>>, String> {
        self.linearize_within(class, &mut Vec::new())
    }

    fn linearize_within(
        &self,
        class: &ClassDef,
        visiting: &mut Vec<String>,
    ) -> std::result::Result<Vec<Arc<ClassDef>>, String> {
        let qualified_name = class.qualified_name();
        if visiting.contains(&qualified_name) {
            return Err(format!("cyclic inheritance through {qualified_name}"));
        }

        let bases = self.resolve_bases(class);
        visiting.push(qualified_name);
        let mut sequences = Vec::with_capacity(bases.len() + 1);
        for base in &bases {
            sequences.push(self.linearize_within(base, visiting)?);
        }
        visiting.pop();
        sequences.push(bases);

        let mut order = vec![Arc::new(class.clone())];
        loop {
            sequences.retain(|sequence| !sequence.is_empty());
            if sequences.is_empty() {
                return Ok(order);
            }

            // first head that appears in no sequence's tail
            let head = sequences
                .iter()
                .map(|sequence| &sequence[0])
                .find(|candidate| {
                    let name = candidate.qualified_name();
                    sequences
                        .iter()
                        .all(|sequence| sequence[1..].iter().all(|c| c.qualified_name() != name))
                })
                .cloned()
                .ok_or_else(|| {
                    format!(
                        "cannot create a consistent resolution order for {}",
                        class.qualified_name()
                    )
                })?;

            let name = head.qualified_name();
            for sequence in &mut sequences {
                if sequence[0].qualified_name() == name {
                    sequence.remove(0);
                }
            }
            order.push(head);
        }
    }
}

/// Validate a module symbol as a concrete plugin class
///
/// Rejects, in order: symbols that are not classes, classes without the
/// capability base among their ancestors, and classes that never resolve a
/// `secret_type` (abstract). Classes whose hierarchy cannot be linearized are
/// rejected too; the importer reports those as import failures beforehand.
#[must_use]
pub fn concrete_plugin(name: &str, symbol: &Symbol, classes: &ClassTable) -> Option<PluginClass> {
    let Symbol::Class(class) = symbol else {
        return None;
    };

    let chain = match classes.linearize(class) {
        Ok(chain) => chain,
        Err(reason) => {
            tracing::debug!(class = %class.qualified_name(), %reason, "invalid class hierarchy");
            return None;
        }
    };
    let capability = capability_qualified_name();
    if !chain.iter().any(|c| c.qualified_name() == capability) {
        return None;
    }

    let Some(secret_type) = chain.iter().find_map(|c| c.secret_type.clone()) else {
        tracing::debug!(class = %class.qualified_name(), "skipping abstract plugin class");
        return None;
    };

    let mut attributes = toml::Table::new();
    for ancestor in chain.iter().rev() {
        attributes.extend(ancestor.attributes.clone());
    }

    Some(PluginClass {
        name: name.to_string(),
        qualified_name: class.qualified_name(),
        module_id: class.module_id.clone(),
        source: class.source.clone(),
        ancestors: chain.iter().map(|c| c.qualified_name()).collect(),
        secret_type,
        attributes,
    })
}

/// Whether a module symbol is a concrete plugin class
#[must_use]
pub fn is_concrete_plugin(name: &str, symbol: &Symbol, classes: &ClassTable) -> bool {
    concrete_plugin(name, symbol, classes).is_some()
}
