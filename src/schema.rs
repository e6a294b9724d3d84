//! Option schema: every configuration key with its type and default.
//!
//! The schema is a tree whose leaves are [`OptionNode`]s. It drives both
//! default extraction and validation of user-supplied layers.

use protoplan_plugin_interface::{ConfigTree, ConfigValue};
use std::collections::BTreeMap;
use std::fmt;

/// Type of a single option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionType {
    Bool,
    Int,
    String,
    /// A string restricted to a fixed set of values
    Enum(Vec<String>),
    List(Box<OptionType>),
    /// Either a single `T` or a list of `T`
    Either(Box<OptionType>),
    /// Opaque reference to a tool or package, carried as a string
    Reference,
    /// Free-form nested attributes
    Attrs,
}

impl OptionType {
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionType::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn list_of(inner: OptionType) -> Self {
        OptionType::List(Box::new(inner))
    }

    pub fn either(inner: OptionType) -> Self {
        OptionType::Either(Box::new(inner))
    }

    /// Whether `value` is a valid value of this type. `Null` is never
    /// accepted here; nullability belongs to the [`OptionNode`].
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        match (self, value) {
            (OptionType::Bool, ConfigValue::Bool(_)) => true,
            (OptionType::Int, ConfigValue::Int(_)) => true,
            (OptionType::String | OptionType::Reference, ConfigValue::String(_)) => true,
            (OptionType::Enum(allowed), ConfigValue::String(s)) => allowed.iter().any(|a| a == s),
            (OptionType::List(inner), ConfigValue::List(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            (OptionType::Either(inner), ConfigValue::List(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            (OptionType::Either(inner), single) => inner.accepts(single),
            (OptionType::Attrs, ConfigValue::Tree(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Bool => write!(f, "bool"),
            OptionType::Int => write!(f, "int"),
            OptionType::String => write!(f, "string"),
            OptionType::Enum(values) => {
                let quoted: Vec<_> = values.iter().map(|v| format!("\"{}\"", v)).collect();
                write!(f, "one of {}", quoted.join(", "))
            }
            OptionType::List(inner) => write!(f, "list of {}", inner),
            OptionType::Either(inner) => write!(f, "{} or list of {}", inner, inner),
            OptionType::Reference => write!(f, "reference"),
            OptionType::Attrs => write!(f, "attrs"),
        }
    }
}

/// A leaf of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionNode {
    pub ty: OptionType,
    /// Default value; `None` makes the option nullable with a `null` default.
    pub default: Option<ConfigValue>,
    pub description: String,
}

impl OptionNode {
    pub fn new(ty: OptionType, default: Option<ConfigValue>, description: &str) -> Self {
        Self {
            ty,
            default,
            description: description.to_string(),
        }
    }

    pub fn bool(default: bool, description: &str) -> Self {
        Self::new(OptionType::Bool, Some(default.into()), description)
    }

    pub fn int(default: i64, description: &str) -> Self {
        Self::new(OptionType::Int, Some(default.into()), description)
    }

    pub fn string(default: &str, description: &str) -> Self {
        Self::new(OptionType::String, Some(default.into()), description)
    }

    pub fn enumeration(values: &[&str], default: &str, description: &str) -> Self {
        Self::new(
            OptionType::enumeration(values.iter().copied()),
            Some(default.into()),
            description,
        )
    }

    pub fn strings(default: &[&str], description: &str) -> Self {
        Self::new(
            OptionType::list_of(OptionType::String),
            Some(ConfigValue::strings(default.iter().copied())),
            description,
        )
    }

    /// A string list with no default; unset reads as `null`.
    pub fn optional_strings(description: &str) -> Self {
        Self::new(OptionType::list_of(OptionType::String), None, description)
    }

    pub fn reference(default: &str, description: &str) -> Self {
        Self::new(OptionType::Reference, Some(default.into()), description)
    }

    pub fn nullable(&self) -> bool {
        self.default.is_none()
    }

    /// Whether `value` may be assigned to this option.
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        match value {
            ConfigValue::Null => self.nullable(),
            other => self.ty.accepts(other),
        }
    }

    /// Default value, with `null` for nullable options.
    pub fn default_value(&self) -> ConfigValue {
        self.default.clone().unwrap_or(ConfigValue::Null)
    }
}

/// Either a leaf option or a nested group of options.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaEntry {
    Option(OptionNode),
    Tree(OptionSchema),
}

/// A tree of options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSchema {
    entries: BTreeMap<String, SchemaEntry>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style leaf option.
    pub fn option(mut self, key: &str, node: OptionNode) -> Self {
        self.entries.insert(key.to_string(), SchemaEntry::Option(node));
        self
    }

    /// Builder-style nested group. A group added twice is merged.
    pub fn tree(mut self, key: &str, schema: OptionSchema) -> Self {
        match self.entries.remove(key) {
            Some(SchemaEntry::Tree(existing)) => {
                self.entries
                    .insert(key.to_string(), SchemaEntry::Tree(existing.merged(schema)));
            }
            _ => {
                self.entries.insert(key.to_string(), SchemaEntry::Tree(schema));
            }
        }
        self
    }

    fn merged(mut self, other: OptionSchema) -> Self {
        for (key, entry) in other.entries {
            self = match entry {
                SchemaEntry::Option(node) => self.option(&key, node),
                SchemaEntry::Tree(tree) => self.tree(&key, tree),
            };
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    /// Look up the leaf option at a dotted path.
    pub fn option_at(&self, path: &[&str]) -> Option<&OptionNode> {
        let (last, parents) = path.split_last()?;
        let mut schema = self;
        for key in parents {
            match schema.get(key)? {
                SchemaEntry::Tree(tree) => schema = tree,
                SchemaEntry::Option(_) => return None,
            }
        }
        match schema.get(last)? {
            SchemaEntry::Option(node) => Some(node),
            SchemaEntry::Tree(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every leaf option with its dotted path, depth first in key order.
    pub fn flatten(&self) -> Vec<(String, &OptionNode)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a OptionNode)>) {
        for (key, entry) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match entry {
                SchemaEntry::Option(node) => out.push((path, node)),
                SchemaEntry::Tree(tree) => tree.flatten_into(&path, out),
            }
        }
    }

    /// Same-shaped tree holding only default values.
    pub fn extract_defaults(&self) -> ConfigTree {
        self.entries
            .iter()
            .map(|(key, entry)| {
                let value = match entry {
                    SchemaEntry::Option(node) => node.default_value(),
                    SchemaEntry::Tree(tree) => ConfigValue::Tree(tree.extract_defaults()),
                };
                (key.clone(), value)
            })
            .collect()
    }
}
