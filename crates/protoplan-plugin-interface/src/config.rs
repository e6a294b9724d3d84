//! Configuration values shared between the host and plugin modules.
//!
//! The host resolves a single [`EffectiveConfig`] per invocation and hands
//! read-only views of it to every plugin module. Values are a small typed
//! tree: scalars, lists and nested trees, plus `Null` for options that are
//! intentionally left unset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// An unset option (e.g. a language without its own `files` list)
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<ConfigValue>),
    Tree(ConfigTree),
}

impl ConfigValue {
    /// Build a list value from string items.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(
            items
                .into_iter()
                .map(|s| ConfigValue::String(s.into()))
                .collect(),
        )
    }

    /// Short name of the value's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::String(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Tree(_) => "attrs",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// String items of a list value. Non-string items are skipped.
    pub fn as_str_list(&self) -> Option<Vec<String>> {
        self.as_list().map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(value: ConfigTree) -> Self {
        ConfigValue::Tree(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::List(value)
    }
}

/// A mapping from key to value or nested tree.
///
/// Keys are kept sorted so that output derived from a tree is deterministic.
/// Declaration order is never read from a tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(BTreeMap<String, ConfigValue>);

impl ConfigTree {
    pub const fn new() -> Self {
        ConfigTree(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Look up a value by path, descending through nested trees.
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for key in parents {
            tree = tree.tree(key)?;
        }
        tree.get(last)
    }

    /// Nested tree under `key`, if that key holds a tree.
    pub fn tree(&self, key: &str) -> Option<&ConfigTree> {
        self.get(key).and_then(ConfigValue::as_tree)
    }

    /// Boolean under `key`; absent or non-boolean values read as `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(ConfigValue::as_bool).unwrap_or(false)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_int)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// String list under `key`; absent, null or non-list values read as empty.
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.get_opt_str_list(key).unwrap_or_default()
    }

    /// String list under `key`, keeping the difference between unset and empty.
    pub fn get_opt_str_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(ConfigValue::as_str_list)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.0.iter()
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigTree {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        ConfigTree(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConfigTree {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ConfigTree {
    type Item = (String, ConfigValue);
    type IntoIter = btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The fully resolved configuration for one invocation.
///
/// Produced once by the host's resolver and never mutated afterwards.
/// [`EffectiveConfig::with_language`] returns a new value rather than
/// changing this one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EffectiveConfig(ConfigTree);

impl EffectiveConfig {
    pub fn new(tree: ConfigTree) -> Self {
        Self(tree)
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.0
    }

    pub fn into_tree(self) -> ConfigTree {
        self.0
    }

    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        self.0.get_path(path)
    }

    /// Project root used for proto discovery.
    pub fn root(&self) -> &str {
        self.0.get_str("root").unwrap_or(".")
    }

    /// The `protoc` subtree, or an empty tree when absent.
    pub fn protoc(&self) -> &ConfigTree {
        static EMPTY: ConfigTree = ConfigTree::new();
        self.0.tree("protoc").unwrap_or(&EMPTY)
    }

    /// Configuration of a single language.
    pub fn language(&self, name: &str) -> Option<&ConfigTree> {
        self.0.tree("languages").and_then(|l| l.tree(name))
    }

    /// A copy of this configuration with `languages.<name>` replaced.
    pub fn with_language(&self, name: &str, local: ConfigTree) -> EffectiveConfig {
        let mut tree = self.0.clone();
        let mut languages = tree.tree("languages").cloned().unwrap_or_default();
        languages.insert(name, local);
        tree.insert("languages", languages);
        EffectiveConfig(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ConfigTree {
        ConfigTree::new().with("root", "proto").with(
            "languages",
            ConfigTree::new().with(
                "go",
                ConfigTree::new()
                    .with("enable", true)
                    .with("outputPath", ConfigValue::strings(["gen/go", "pkg/proto"]))
                    .with("files", ConfigValue::Null),
            ),
        )
    }

    #[test]
    fn test_get_path_descends_trees() {
        let tree = sample();
        assert_eq!(
            tree.get_path(&["languages", "go", "enable"]),
            Some(&ConfigValue::Bool(true))
        );
        assert_eq!(tree.get_path(&["languages", "js", "enable"]), None);
        assert_eq!(tree.get_path(&[]), None);
    }

    #[test]
    fn test_typed_getters_are_lenient() {
        let tree = sample();
        let go = tree.get_path(&["languages", "go"]).and_then(ConfigValue::as_tree).unwrap();
        assert!(go.get_bool("enable"));
        assert!(!go.get_bool("missing"));
        assert_eq!(go.get_str_list("outputPath"), vec!["gen/go", "pkg/proto"]);
        assert_eq!(go.get_opt_str_list("files"), None);
        assert_eq!(go.get_str("outputPath"), None);
    }

    #[test]
    fn test_with_language_leaves_original_untouched() {
        let effective = EffectiveConfig::new(sample());
        let scoped_local = effective
            .language("go")
            .cloned()
            .unwrap()
            .with("outputPath", "gen/go");
        let scoped = effective.with_language("go", scoped_local);

        assert_eq!(
            scoped.get_path(&["languages", "go", "outputPath"]),
            Some(&ConfigValue::from("gen/go"))
        );
        assert_eq!(
            effective.language("go").unwrap().get_str_list("outputPath"),
            vec!["gen/go", "pkg/proto"]
        );
        assert_eq!(scoped.root(), "proto");
    }

    #[test]
    fn test_protoc_defaults_to_empty_tree() {
        let effective = EffectiveConfig::new(ConfigTree::new());
        assert!(effective.protoc().is_empty());
        assert_eq!(effective.root(), ".");
    }

    #[test]
    fn test_null_serializes_as_json_null() {
        let tree = ConfigTree::new().with("files", ConfigValue::Null).with("n", 3i64);
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"files":null,"n":3}"#);

        let parsed: ConfigTree = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tree);
    }
}
