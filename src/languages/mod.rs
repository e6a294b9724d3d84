//! Builtin languages and their feature modules.
//!
//! Each language declares its option subtree, its modules (base generator
//! first) and the precedence rules that settle which module owns an output
//! flag when two of them claim the same plugin family.

pub mod cpp;
pub mod doc;
pub mod go;
pub mod java;
pub mod js;
pub mod php;
pub mod python;
pub mod rust;

use protoplan_plugin_interface::{ConfigTree, PluginModule};

use crate::schema::{OptionNode, OptionSchema, OptionType};

/// `primary` takes over the output flag of `subsumed` when both emit one
/// for the same plugin family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub primary: &'static str,
    pub subsumed: &'static str,
}

/// A language: its options, its modules in composition order, and its
/// precedence rules.
#[derive(Debug)]
pub struct LanguageSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: OptionSchema,
    pub modules: Vec<Box<dyn PluginModule>>,
    pub precedence: Vec<Precedence>,
}

impl LanguageSpec {
    /// Whether a declared rule lets `primary` take over from `subsumed`.
    pub fn subsumes(&self, primary: &str, subsumed: &str) -> bool {
        self.precedence
            .iter()
            .any(|p| p.primary == primary && p.subsumed == subsumed)
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }
}

/// Builtin languages in declaration order. Plans list units in this order.
pub const BUILTIN: &[fn() -> LanguageSpec] = &[
    go::spec,
    python::spec,
    js::spec,
    cpp::spec,
    java::spec,
    php::spec,
    rust::spec,
    doc::spec,
];

/// Options every language carries.
///
/// `package` is only declared when the base generator is an external
/// plugin rather than built into `protoc`.
pub fn common_options(name: &str, package: Option<&str>, default_options: &[&str]) -> OptionSchema {
    let schema = OptionSchema::new()
        .option(
            "enable",
            OptionNode::bool(false, &format!("Whether to generate {} code.", name)),
        )
        .option(
            "outputPath",
            OptionNode::new(
                OptionType::either(OptionType::String),
                Some(format!("gen/{}", name).into()),
                "Output directory, or a list of directories each receiving the full output.",
            ),
        )
        .option(
            "options",
            OptionNode::strings(default_options, "Parameters passed to the base generator."),
        )
        .option(
            "files",
            OptionNode::optional_strings(
                "Files to compile for this language. Unset uses protoc.files.",
            ),
        )
        .option(
            "additionalFiles",
            OptionNode::strings(&[], "Files appended after the resolved file set."),
        )
        .option(
            "initHooks",
            OptionNode::strings(&[], "Shell commands run before the compiler."),
        )
        .option(
            "generateHooks",
            OptionNode::strings(&[], "Shell commands run after the compiler."),
        );

    match package {
        Some(default) => schema.option(
            "package",
            OptionNode::reference(default, "Plugin executable of the base generator."),
        ),
        None => schema,
    }
}

/// Options of a feature section: `enable`, and `package` when the feature
/// is backed by its own plugin executable.
pub fn feature_options(description: &str, package: Option<&str>) -> OptionSchema {
    let schema = OptionSchema::new().option("enable", OptionNode::bool(false, description));
    match package {
        Some(default) => schema.option(
            "package",
            OptionNode::reference(default, "Plugin executable for this feature."),
        ),
        None => schema,
    }
}

/// The scoped output path of a language configuration.
pub(crate) fn output_path(local: &ConfigTree) -> &str {
    local.get_str("outputPath").unwrap_or_default()
}

/// A feature's subtree, or an empty tree when absent.
pub(crate) fn section<'a>(local: &'a ConfigTree, key: &str) -> &'a ConfigTree {
    static EMPTY: ConfigTree = ConfigTree::new();
    local.tree(key).unwrap_or(&EMPTY)
}

/// Plugin package of a tree, falling back to `default`.
pub(crate) fn package<'a>(tree: &'a ConfigTree, default: &'a str) -> &'a str {
    tree.get_str("package").unwrap_or(default)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_are_unique() {
        let names: Vec<_> = BUILTIN.iter().map(|f| f().name).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
        assert_eq!(names.first(), Some(&"go"));
    }

    #[test]
    fn test_every_language_has_common_options() {
        for ctor in BUILTIN {
            let spec = ctor();
            for key in ["enable", "outputPath", "options", "files", "additionalFiles"] {
                assert!(
                    spec.options.option_at(&[key]).is_some(),
                    "{} is missing {}",
                    spec.name,
                    key
                );
            }
        }
    }

    #[test]
    fn test_module_names_unique_and_base_first() {
        for ctor in BUILTIN {
            let spec = ctor();
            let names = spec.module_names();
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(names.len(), unique.len(), "{}", spec.name);
            assert!(spec.modules[0].section().is_none(), "{}", spec.name);
        }
    }

    #[test]
    fn test_feature_sections_are_declared_options() {
        for ctor in BUILTIN {
            let spec = ctor();
            for module in &spec.modules {
                if let Some(key) = module.section() {
                    assert!(
                        spec.options.option_at(&[key, "enable"]).is_some(),
                        "{}.{} has no enable option",
                        spec.name,
                        key
                    );
                }
            }
        }
    }

    #[test]
    fn test_precedence_rules_name_real_modules() {
        for ctor in BUILTIN {
            let spec = ctor();
            let names = spec.module_names();
            for rule in &spec.precedence {
                assert!(names.contains(&rule.primary), "{}", spec.name);
                assert!(names.contains(&rule.subsumed), "{}", spec.name);
            }
        }
    }
}
