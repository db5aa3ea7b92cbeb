//! Plugin source format (`*.toml` plugin modules)
//!
//! A plugin module is a TOML document. Every top-level table carrying an
//! `extends` key defines a class; any other top-level entry is a plain value.
//!
//! ```toml
//! [AwsKeyDetector]
//! extends = "plugins.base.RegexBasedDetector"
//! secret_type = "AWS Access Key"
//! patterns = ["AKIA[0-9A-Z]{16}"]
//! ```

use std::path::{Path, PathBuf};

/// Key naming the base classes of a class definition
pub const EXTENDS_KEY: &str = "extends";

/// Key declaring the secret type a class detects
pub const SECRET_TYPE_KEY: &str = "secret_type";

/// A top-level definition in a loaded plugin module
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// A class definition
    Class(ClassDef),
    /// Anything else: constants, data tables, arrays
    Value(toml::Value),
}

impl Symbol {
    /// Interpret a top-level TOML entry
    ///
    /// Fails when an entry looks like a class but its `extends` or
    /// `secret_type` declaration is malformed.
    pub(crate) fn parse(
        name: &str,
        value: toml::Value,
        module_id: &str,
        source: &Path,
    ) -> std::result::Result<Self, String> {
        match value {
            toml::Value::Table(table) if table.contains_key(EXTENDS_KEY) => {
                ClassDef::from_table(name, module_id, source, table).map(Self::Class)
            }
            other => Ok(Self::Value(other)),
        }
    }

    /// The class definition, if this symbol is one
    #[must_use]
    pub const fn as_class(&self) -> Option<&ClassDef> {
        match self {
            Self::Class(class) => Some(class),
            Self::Value(_) => None,
        }
    }
}

/// A class declared in a plugin module
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    /// Name the class is bound to in its module
    pub name: String,
    /// Identifier of the defining module
    pub module_id: String,
    /// File the class was loaded from
    pub source: PathBuf,
    /// Base class references, in declaration order
    pub bases: Vec<String>,
    /// `secret_type` declared on this class itself (`None` leaves it abstract)
    pub secret_type: Option<String>,
    /// Remaining attributes
    pub attributes: toml::Table,
}

impl ClassDef {
    /// Dotted name unique across modules (`<module_id>.<name>`)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module_id, self.name)
    }

    fn from_table(
        name: &str,
        module_id: &str,
        source: &Path,
        mut table: toml::Table,
    ) -> std::result::Result<Self, String> {
        let bases = match table.remove(EXTENDS_KEY) {
            Some(toml::Value::String(base)) => vec![base],
            Some(toml::Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    toml::Value::String(base) => Ok(base),
                    other => Err(format!(
                        "class {name}: `{EXTENDS_KEY}` entries must be strings, found {}",
                        other.type_str()
                    )),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(format!(
                    "class {name}: `{EXTENDS_KEY}` must be a string or array of strings, found {}",
                    other.type_str()
                ));
            }
            None => Vec::new(),
        };

        let secret_type = match table.remove(SECRET_TYPE_KEY) {
            Some(toml::Value::String(secret_type)) => Some(secret_type),
            Some(other) => {
                return Err(format!(
                    "class {name}: `{SECRET_TYPE_KEY}` must be a string, found {}",
                    other.type_str()
                ));
            }
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            module_id: module_id.to_string(),
            source: source.to_path_buf(),
            bases,
            secret_type,
            attributes: table,
        })
    }
}
