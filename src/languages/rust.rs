//! Rust: prost messages, tonic services and the prost-crate module tree.

use protoplan_plugin_interface::{
    option_flags, output_flag, ConfigTree, EffectiveConfig, HookStep, PluginModule,
    PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec};
use crate::schema::OptionNode;
use crate::script::quote_arg;

const PROST_PACKAGE: &str = "protoc-gen-prost";

pub fn spec() -> LanguageSpec {
    let options = common_options("rust", Some(PROST_PACKAGE), &[])
        .option(
            "format",
            OptionNode::bool(false, "Run rustfmt over the generated sources."),
        )
        .tree(
            "tonic",
            feature_options("Generate tonic service stubs.", Some("protoc-gen-tonic"))
                .option("options", OptionNode::strings(&[], "Parameters for protoc-gen-tonic.")),
        )
        .tree(
            "crate",
            feature_options("Generate a module tree for the output crate.", Some("protoc-gen-prost-crate"))
                .option(
                    "options",
                    OptionNode::strings(&["no_features"], "Parameters for protoc-gen-prost-crate."),
                ),
        );

    LanguageSpec {
        name: "rust",
        description: "Rust messages via protoc-gen-prost",
        options,
        modules: vec![Box::new(Base), Box::new(Tonic), Box::new(Crate)],
        precedence: Vec::new(),
    }
}

#[derive(Debug)]
struct Base;

impl PluginModule for Base {
    fn name(&self) -> &str {
        "base"
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let path = output_path(local);
        let result = PluginModuleResult::empty()
            .with_runtime_input(package(local, PROST_PACKAGE))
            .with_plugin(output_flag("prost", &[], path))
            .with_plugins(option_flags("prost", &local.get_str_list("options")));

        if !local.get_bool("format") {
            return result;
        }

        result.with_runtime_input("rustfmt").with_generate_hook(HookStep::command(
            "rustfmt",
            format!(
                "find {} -name '*.rs' -exec rustfmt --edition 2021 {{}} +",
                quote_arg(path)
            ),
        ))
    }
}

#[derive(Debug)]
struct Tonic;

impl PluginModule for Tonic {
    fn name(&self) -> &str {
        "tonic"
    }

    fn section(&self) -> Option<&str> {
        Some("tonic")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let tonic = section(local, "tonic");
        PluginModuleResult::empty()
            .with_runtime_input(package(tonic, "protoc-gen-tonic"))
            .with_plugin(output_flag("tonic", &[], output_path(local)))
            .with_plugins(option_flags("tonic", &tonic.get_str_list("options")))
    }
}

#[derive(Debug)]
struct Crate;

impl PluginModule for Crate {
    fn name(&self) -> &str {
        "crate"
    }

    fn section(&self) -> Option<&str> {
        Some("crate")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let krate = section(local, "crate");
        PluginModuleResult::empty()
            .with_runtime_input(package(krate, "protoc-gen-prost-crate"))
            .with_plugin(output_flag("prost-crate", &[], output_path(local)))
            .with_plugins(option_flags("prost-crate", &krate.get_str_list("options")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::{enable, scoped};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prost_base() {
        let (global, local) = scoped("rust", "src/pb", |l| l);
        let result = Base.evaluate(&global, &local);
        assert_eq!(result.protoc_plugins, vec!["--prost_out=src/pb"]);
        assert!(result.generate_hooks.is_empty());
    }

    #[test]
    fn test_format_adds_rustfmt_hook() {
        let (global, local) = scoped("rust", "src/pb", |l| l.with("format", true));
        let result = Base.evaluate(&global, &local);
        assert_eq!(result.generate_hooks.len(), 1);
        assert_eq!(result.generate_hooks[0].name(), "rustfmt");
        assert!(result.runtime_inputs.iter().any(|t| t.name() == "rustfmt"));
    }

    #[test]
    fn test_tonic_and_crate_flags() {
        let (global, local) = scoped("rust", "src/pb", |l| enable(enable(l, "tonic"), "crate"));
        assert_eq!(
            Tonic.evaluate(&global, &local).protoc_plugins,
            vec!["--tonic_out=src/pb"]
        );
        assert_eq!(
            Crate.evaluate(&global, &local).protoc_plugins,
            vec!["--prost-crate_out=src/pb", "--prost-crate_opt=no_features"]
        );
    }
}
