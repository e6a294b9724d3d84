//! Combining a language's modules into one result.
//!
//! Modules are evaluated in declaration order and their results are
//! concatenated field by field. A module that is switched off contributes
//! the empty result. Before concatenation, output flags are checked so that
//! at most one module owns the `--<family>_out` flag of each plugin family.
//! The owner also owns the family's `--<family>_opt` flags.

use protoplan_plugin_interface::{
    option_family, output_family, ConfigTree, ConfigValue, EffectiveConfig, HookStep, PluginModule,
    PluginModuleResult,
};
use std::collections::BTreeSet;

use crate::error::PlanError;
use crate::languages::LanguageSpec;

/// Concatenate the results of `modules` in order.
///
/// Disabled modules contribute nothing. No conflict checks happen here; see
/// [`compose_language`] for that.
pub fn combine(
    modules: &[Box<dyn PluginModule>],
    global: &EffectiveConfig,
    local: &ConfigTree,
) -> PluginModuleResult {
    evaluate_modules(modules, global, local)
        .into_iter()
        .fold(PluginModuleResult::empty(), |mut acc, (_, result)| {
            acc.append(result);
            acc
        })
}

fn evaluate_modules<'a>(
    modules: &'a [Box<dyn PluginModule>],
    global: &EffectiveConfig,
    local: &ConfigTree,
) -> Vec<(&'a str, PluginModuleResult)> {
    modules
        .iter()
        .map(|module| {
            let result = if module.is_enabled(local) {
                module.evaluate(global, local)
            } else {
                PluginModuleResult::empty()
            };
            (module.name(), result)
        })
        .collect()
}

/// Full composition of one language for one output path.
///
/// `local` must carry a single-string `outputPath`. Conflicting output
/// flags are settled by the language's precedence rules, and the user's
/// `initHooks`/`generateHooks` are appended after the module hooks.
pub fn compose_language(
    spec: &LanguageSpec,
    global: &EffectiveConfig,
    local: &ConfigTree,
) -> Result<PluginModuleResult, PlanError> {
    let output_path = match local.get("outputPath") {
        Some(ConfigValue::String(path)) => path.as_str(),
        _ => {
            return Err(PlanError::UnscopedOutputPath {
                language: spec.name.to_string(),
            });
        }
    };

    let mut evaluated = evaluate_modules(&spec.modules, global, local);
    resolve_output_conflicts(spec, output_path, &mut evaluated)?;

    let mut combined = evaluated
        .into_iter()
        .fold(PluginModuleResult::empty(), |mut acc, (_, result)| {
            acc.append(result);
            acc
        });

    for (i, command) in local.get_str_list("initHooks").into_iter().enumerate() {
        combined
            .init_hooks
            .push(HookStep::command(format!("{}-init-{}", spec.name, i + 1), command));
    }
    for (i, command) in local.get_str_list("generateHooks").into_iter().enumerate() {
        combined
            .generate_hooks
            .push(HookStep::command(format!("{}-generate-{}", spec.name, i + 1), command));
    }

    tracing::debug!(
        language = spec.name,
        output_path,
        flags = combined.protoc_plugins.len(),
        "Composed modules"
    );
    Ok(combined)
}

/// Make sure each plugin family has a single owning module.
///
/// Claimants of a family are compared pairwise in declaration order. A
/// precedence rule in either direction drops the subsumed module's `_out`
/// and `_opt` flags for that family; a pair without a rule is a conflict.
fn resolve_output_conflicts(
    spec: &LanguageSpec,
    output_path: &str,
    evaluated: &mut [(&str, PluginModuleResult)],
) -> Result<(), PlanError> {
    let families: BTreeSet<String> = evaluated
        .iter()
        .flat_map(|(_, result)| result.protoc_plugins.iter())
        .filter_map(|flag| output_family(flag).map(str::to_string))
        .collect();

    for family in families {
        let claimants: Vec<usize> = evaluated
            .iter()
            .enumerate()
            .filter(|(_, (_, result))| {
                result
                    .protoc_plugins
                    .iter()
                    .any(|flag| output_family(flag) == Some(family.as_str()))
            })
            .map(|(i, _)| i)
            .collect();

        let mut suppressed = BTreeSet::new();
        for (n, &a) in claimants.iter().enumerate() {
            for &b in &claimants[n + 1..] {
                if suppressed.contains(&a) || suppressed.contains(&b) {
                    continue;
                }
                let (name_a, name_b) = (evaluated[a].0, evaluated[b].0);
                if spec.subsumes(name_b, name_a) {
                    suppressed.insert(a);
                } else if spec.subsumes(name_a, name_b) {
                    suppressed.insert(b);
                } else {
                    return Err(PlanError::CompositionConflict {
                        language: spec.name.to_string(),
                        output_path: output_path.to_string(),
                        family,
                        first: name_a.to_string(),
                        second: name_b.to_string(),
                    });
                }
            }
        }

        for i in suppressed {
            let (name, result) = &mut evaluated[i];
            tracing::debug!(
                language = spec.name,
                module = *name,
                family = family.as_str(),
                "Family flags subsumed by precedence rule"
            );
            let family = Some(family.as_str());
            result
                .protoc_plugins
                .retain(|flag| output_family(flag) != family && option_family(flag) != family);
        }
    }

    Ok(())
}
