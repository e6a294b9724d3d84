//! Layered resolution of the effective configuration.
//!
//! `effective = merge(merge(schema defaults, package defaults), user overrides)`
//! where merging recurses into trees and replaces everything else wholesale.
//! Both layers are validated against the schema before anything is merged.

use protoplan_plugin_interface::{ConfigTree, ConfigValue, EffectiveConfig};

use crate::error::ConfigError;
use crate::schema::{OptionSchema, SchemaEntry};

/// Right-biased deep merge of two trees.
///
/// Where both sides hold a tree the merge recurses; otherwise the value from
/// `overlay` replaces the one in `base`. Lists are replaced, never appended.
pub fn deep_merge(base: &ConfigTree, overlay: &ConfigTree) -> ConfigTree {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let next = match (merged.get(key), value) {
            (Some(ConfigValue::Tree(left)), ConfigValue::Tree(right)) => {
                ConfigValue::Tree(deep_merge(left, right))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Defaults of the whole schema, same shape as the schema.
pub fn extract_defaults(schema: &OptionSchema) -> ConfigTree {
    schema.extract_defaults()
}

/// Defaults of the subtree at `path` (e.g. `["languages", "go"]`).
///
/// Returns `None` if the path does not name a group of options.
pub fn extract_defaults_at(schema: &OptionSchema, path: &[&str]) -> Option<ConfigTree> {
    let mut current = schema;
    for key in path {
        match current.get(key)? {
            SchemaEntry::Tree(tree) => current = tree,
            SchemaEntry::Option(_) => return None,
        }
    }
    Some(current.extract_defaults())
}

/// Check every key of `layer` against the schema.
pub fn validate_layer(schema: &OptionSchema, layer: &ConfigTree) -> Result<(), ConfigError> {
    validate_tree(schema, layer, "")
}

fn validate_tree(schema: &OptionSchema, tree: &ConfigTree, prefix: &str) -> Result<(), ConfigError> {
    for (key, value) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match schema.get(key) {
            None => return Err(ConfigError::UnknownOption { path }),
            Some(SchemaEntry::Tree(sub)) => match value {
                ConfigValue::Tree(sub_tree) => validate_tree(sub, sub_tree, &path)?,
                other => {
                    return Err(ConfigError::TypeMismatch {
                        path,
                        expected: "attrs".to_string(),
                        found: other.type_name(),
                    });
                }
            },
            Some(SchemaEntry::Option(node)) => {
                if !node.accepts(value) {
                    let expected = if node.nullable() {
                        format!("{} or null", node.ty)
                    } else {
                        node.ty.to_string()
                    };
                    return Err(ConfigError::TypeMismatch {
                        path,
                        expected,
                        found: value.type_name(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Resolve the effective configuration from the three layers.
///
/// Pure: reads nothing but its arguments. Either layer failing validation
/// aborts the whole resolution.
pub fn resolve(
    schema: &OptionSchema,
    package_defaults: &ConfigTree,
    user_overrides: &ConfigTree,
) -> Result<EffectiveConfig, ConfigError> {
    validate_layer(schema, package_defaults)?;
    validate_layer(schema, user_overrides)?;

    let defaults = extract_defaults(schema);
    let effective = deep_merge(&deep_merge(&defaults, package_defaults), user_overrides);

    tracing::debug!(
        package_keys = package_defaults.len(),
        override_keys = user_overrides.len(),
        "Resolved effective configuration"
    );

    Ok(EffectiveConfig::new(effective))
}
