//! Generation plan compiler.
//!
//! Turns the effective configuration into an ordered list of generation
//! units, one per (language, output path). A language with several output
//! paths is composed again for each path against a copy of the configuration
//! whose `outputPath` holds only that path, so no module ever sees a list.

use protoplan_plugin_interface::{ConfigTree, ConfigValue, EffectiveConfig, HookStep, ToolRef};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::composer::compose_language;
use crate::config::resolve;
use crate::error::PlanError;
use crate::files::{files_for, ProtoDiscovery};
use crate::registry::Registry;

/// One compiler run: a language, a single output path and everything needed
/// to generate into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUnit {
    pub language: String,
    pub output_path: String,
    pub files: Vec<String>,
    pub protoc_plugins: Vec<String>,
    pub init_hooks: Vec<HookStep>,
    pub generate_hooks: Vec<HookStep>,
}

/// The ordered units of one invocation plus the tools they need.
///
/// Units follow language declaration order, then output path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPlan {
    pub units: Vec<GenerationUnit>,
    pub global_runtime_inputs: BTreeSet<ToolRef>,
    pub compiler: ToolRef,
    pub include_paths: Vec<String>,
}

impl GenerationPlan {
    pub fn units_for<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a GenerationUnit> {
        self.units.iter().filter(move |u| u.language == language)
    }
}

/// Output paths of a language: a single string becomes a one-element list,
/// a list is kept as is. Anything else yields no paths.
pub fn normalize(output_path: &ConfigValue) -> Vec<String> {
    match output_path {
        ConfigValue::String(path) => vec![path.clone()],
        ConfigValue::List(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// `-I` paths: `protoc.includeDirectories`, else `protoc.sourceDirectories`,
/// else the project root.
pub fn include_paths(effective: &EffectiveConfig) -> Vec<String> {
    let protoc = effective.protoc();
    let include = protoc.get_str_list("includeDirectories");
    if !include.is_empty() {
        return include;
    }
    let sources = protoc.get_str_list("sourceDirectories");
    if !sources.is_empty() {
        return sources;
    }
    vec![effective.root().to_string()]
}

pub struct PlanCompiler<'a> {
    registry: &'a Registry,
    discovery: &'a dyn ProtoDiscovery,
}

impl<'a> PlanCompiler<'a> {
    pub fn new(registry: &'a Registry, discovery: &'a dyn ProtoDiscovery) -> Self {
        Self {
            registry,
            discovery,
        }
    }

    /// Resolve the configuration layers against the registry's schema, then
    /// compile the result.
    pub fn compile_layers(
        &self,
        package_defaults: &ConfigTree,
        user_overrides: &ConfigTree,
    ) -> Result<GenerationPlan, PlanError> {
        let effective = resolve(&self.registry.option_schema(), package_defaults, user_overrides)?;
        self.compile(&effective)
    }

    /// Build the plan for an effective configuration. Any error aborts the
    /// whole plan.
    pub fn compile(&self, effective: &EffectiveConfig) -> Result<GenerationPlan, PlanError> {
        let compiler = ToolRef::new(effective.protoc().get_str("package").unwrap_or("protoc"));
        let mut units = Vec::new();
        let mut global_runtime_inputs = BTreeSet::from([compiler.clone()]);

        for spec in self.registry.languages() {
            let Some(local) = effective.language(spec.name) else {
                continue;
            };
            if !local.get_bool("enable") {
                continue;
            }

            let paths = local.get("outputPath").map(normalize).unwrap_or_default();
            if paths.is_empty() {
                tracing::warn!(language = spec.name, "Language enabled without an output path");
            }

            for (i, path) in paths.iter().enumerate() {
                let scoped_local = local.clone().with("outputPath", path.as_str());
                let scoped_global = effective.with_language(spec.name, scoped_local.clone());

                let result = compose_language(spec, &scoped_global, &scoped_local)?;
                let files = files_for(spec.name, &scoped_local, &scoped_global, self.discovery)?;

                if i == 0 {
                    global_runtime_inputs.extend(result.runtime_inputs.iter().cloned());
                }

                units.push(GenerationUnit {
                    language: spec.name.to_string(),
                    output_path: path.clone(),
                    files,
                    protoc_plugins: result.protoc_plugins,
                    init_hooks: result.init_hooks,
                    generate_hooks: result.generate_hooks,
                });
            }
        }

        tracing::info!(
            units = units.len(),
            tools = global_runtime_inputs.len(),
            "Compiled generation plan"
        );

        Ok(GenerationPlan {
            units,
            global_runtime_inputs,
            compiler,
            include_paths: include_paths(effective),
        })
    }
}
