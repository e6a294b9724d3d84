//! Loading configuration layers from TOML files and `--set` assignments.
//!
//! Layers are parsed into [`ConfigTree`]s here and handed to the pure
//! resolver. This is the only place configuration touches the filesystem.

use anyhow::{bail, Context, Result};
use protoplan_plugin_interface::{ConfigTree, ConfigValue, EffectiveConfig};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

use crate::config::resolver;
use crate::schema::OptionSchema;
use crate::utils::paths::{find_project_config, get_user_defaults_path};

/// Where the package-defaults and user-override layers come from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Explicit package defaults file (`--defaults`).
    pub defaults: Option<PathBuf>,
    /// Explicit project configuration file (`--config`).
    pub config: Option<PathBuf>,
    /// `dotted.key=value` assignments applied last, in order.
    pub assignments: Vec<String>,
    /// Directory to search upwards from when `config` is not given.
    pub search_from: Option<PathBuf>,
}

/// Parse a TOML document into a configuration tree.
pub fn parse_layer(content: &str) -> Result<ConfigTree> {
    let table: toml::Table = toml::from_str(content)?;
    table_to_tree(table, "")
}

/// Read and parse a TOML layer from disk.
pub fn load_layer(path: &Path) -> Result<ConfigTree> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_layer(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
}

fn table_to_tree(table: toml::Table, prefix: &str) -> Result<ConfigTree> {
    let mut tree = ConfigTree::new();
    for (key, value) in table {
        let path = join_path(prefix, &key);
        let converted = toml_to_value(value, &path)?;
        tree.insert(key, converted);
    }
    Ok(tree)
}

fn toml_to_value(value: Value, path: &str) -> Result<ConfigValue> {
    match value {
        Value::String(s) => Ok(ConfigValue::String(s)),
        Value::Integer(i) => Ok(ConfigValue::Int(i)),
        Value::Boolean(b) => Ok(ConfigValue::Bool(b)),
        Value::Array(items) => {
            let converted: Result<Vec<_>> = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| toml_to_value(item, &format!("{}[{}]", path, i)))
                .collect();
            Ok(ConfigValue::List(converted?))
        }
        Value::Table(table) => Ok(ConfigValue::Tree(table_to_tree(table, path)?)),
        Value::Float(_) => bail!("{}: floating point values are not supported", path),
        Value::Datetime(_) => bail!("{}: datetime values are not supported", path),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Parse a `dotted.key=value` assignment into a single-path tree.
///
/// The value is read as a TOML value (`true`, `3`, `["a", "b"]`, `"s"`);
/// anything that does not parse is taken as a bare string.
pub fn parse_assignment(raw: &str) -> Result<ConfigTree> {
    let Some((key, raw_value)) = raw.split_once('=') else {
        bail!("Invalid assignment '{}': expected key=value", raw);
    };

    let segments: Vec<&str> = key.trim().split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("Invalid assignment '{}': empty key segment", raw);
    }

    let raw_value = raw_value.trim();
    let mut value = match toml::from_str::<toml::Table>(&format!("value = {}", raw_value)) {
        Ok(mut table) => match table.remove("value") {
            Some(v) => toml_to_value(v, key.trim())?,
            None => ConfigValue::String(raw_value.to_string()),
        },
        Err(_) => ConfigValue::String(raw_value.to_string()),
    };

    for segment in segments.iter().rev() {
        value = ConfigValue::Tree(ConfigTree::new().with(*segment, value));
    }

    match value {
        ConfigValue::Tree(tree) => Ok(tree),
        _ => bail!("Invalid assignment '{}'", raw),
    }
}

/// Convert a tree to a TOML table for display. Nulls have no TOML form and
/// are omitted.
pub fn tree_to_toml(tree: &ConfigTree) -> toml::Table {
    let mut table = toml::Table::new();
    for (key, value) in tree {
        if let Some(v) = value_to_toml(value) {
            table.insert(key.clone(), v);
        }
    }
    table
}

fn value_to_toml(value: &ConfigValue) -> Option<Value> {
    match value {
        ConfigValue::Null => None,
        ConfigValue::Bool(b) => Some(Value::Boolean(*b)),
        ConfigValue::Int(i) => Some(Value::Integer(*i)),
        ConfigValue::String(s) => Some(Value::String(s.clone())),
        ConfigValue::List(items) => Some(Value::Array(items.iter().filter_map(value_to_toml).collect())),
        ConfigValue::Tree(tree) => Some(Value::Table(tree_to_toml(tree))),
    }
}

fn load_package_defaults(sources: &ConfigSources) -> Result<ConfigTree> {
    if let Some(ref path) = sources.defaults {
        tracing::debug!("Loading package defaults from {:?}", path);
        return load_layer(path);
    }

    let user_defaults = get_user_defaults_path()?;
    if user_defaults.is_file() {
        tracing::debug!("Loading package defaults from {:?}", user_defaults);
        return load_layer(&user_defaults);
    }

    Ok(ConfigTree::new())
}

fn load_user_overrides(sources: &ConfigSources) -> Result<ConfigTree> {
    let config_path = match (&sources.config, &sources.search_from) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => find_project_config(dir),
        (None, None) => None,
    };

    let mut overrides = match config_path {
        Some(path) => {
            tracing::info!("Using project configuration {:?}", path);
            load_layer(&path)?
        }
        None => {
            tracing::info!("No project configuration found, using defaults");
            ConfigTree::new()
        }
    };

    for raw in &sources.assignments {
        let assignment = parse_assignment(raw)?;
        overrides = resolver::deep_merge(&overrides, &assignment);
    }

    Ok(overrides)
}

/// Load both layers and resolve them against `schema`.
pub fn load_effective(schema: &OptionSchema, sources: &ConfigSources) -> Result<EffectiveConfig> {
    let package_defaults = load_package_defaults(sources)?;
    resolver::validate_layer(schema, &package_defaults).context("Invalid package defaults")?;

    let user_overrides = load_user_overrides(sources)?;
    resolver::validate_layer(schema, &user_overrides).context("Invalid project configuration")?;

    Ok(resolver::resolve(schema, &package_defaults, &user_overrides)?)
}
