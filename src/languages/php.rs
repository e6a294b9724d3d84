//! PHP: builtin generator, grpc_php_plugin and Laravel service providers.

use protoplan_plugin_interface::{
    output_flag, ConfigTree, EffectiveConfig, HookStep, PluginModule, PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec};
use crate::schema::OptionNode;

pub fn spec() -> LanguageSpec {
    let options = common_options("php", None, &[])
        .tree(
            "grpc",
            feature_options("Generate gRPC client stubs.", Some("grpc_php_plugin"))
                .option("options", OptionNode::strings(&[], "Parameters for grpc_php_plugin.")),
        )
        .tree(
            "laravel",
            feature_options("Generate Laravel service providers.", Some("protoc-gen-laravel"))
                .option(
                    "namespace",
                    OptionNode::string("App\\Grpc", "Namespace of the generated providers."),
                )
                .option(
                    "dumpAutoload",
                    OptionNode::bool(false, "Regenerate the composer autoloader afterwards."),
                ),
        );

    LanguageSpec {
        name: "php",
        description: "PHP messages via protoc's builtin generator",
        options,
        modules: vec![Box::new(Base), Box::new(Grpc), Box::new(Laravel)],
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
        PluginModuleResult::empty()
            .with_plugin(output_flag("php", &local.get_str_list("options"), output_path(local)))
    }
}

#[derive(Debug)]
struct Grpc;

impl PluginModule for Grpc {
    fn name(&self) -> &str {
        "grpc"
    }

    fn section(&self) -> Option<&str> {
        Some("grpc")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let grpc = section(local, "grpc");
        let plugin = package(grpc, "grpc_php_plugin");
        PluginModuleResult::empty()
            .with_runtime_input(plugin)
            .with_plugin(format!("--plugin=protoc-gen-grpc={}", plugin))
            .with_plugin(output_flag("grpc", &grpc.get_str_list("options"), output_path(local)))
    }
}

#[derive(Debug)]
struct Laravel;

impl PluginModule for Laravel {
    fn name(&self) -> &str {
        "laravel"
    }

    fn section(&self) -> Option<&str> {
        Some("laravel")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let laravel = section(local, "laravel");
        let namespace = laravel.get_str("namespace").unwrap_or("App\\Grpc");
        let result = PluginModuleResult::empty()
            .with_runtime_input(package(laravel, "protoc-gen-laravel"))
            .with_plugin(output_flag(
                "laravel",
                &[format!("namespace={}", namespace)],
                output_path(local),
            ));

        if !laravel.get_bool("dumpAutoload") {
            return result;
        }

        result
            .with_runtime_input("composer")
            .with_generate_hook(HookStep::command("composer-dump-autoload", "composer dump-autoload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::{enable, scoped};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_grpc_plugin_flags() {
        let (global, local) = scoped("php", "app/Grpc", |l| enable(l, "grpc"));
        assert_eq!(
            Grpc.evaluate(&global, &local).protoc_plugins,
            vec!["--plugin=protoc-gen-grpc=grpc_php_plugin", "--grpc_out=app/Grpc"]
        );
    }

    #[test]
    fn test_laravel_namespace_param() {
        let (global, local) = scoped("php", "app", |l| enable(l, "laravel"));
        let result = Laravel.evaluate(&global, &local);
        assert_eq!(result.protoc_plugins, vec!["--laravel_out=namespace=App\\Grpc:app"]);
        assert!(result.generate_hooks.is_empty());
    }

    #[test]
    fn test_laravel_dump_autoload_hook() {
        let (global, local) = scoped("php", "app", |l| {
            let l = enable(l, "laravel");
            let laravel = l.tree("laravel").cloned().unwrap().with("dumpAutoload", true);
            l.with("laravel", laravel)
        });
        let result = Laravel.evaluate(&global, &local);
        assert_eq!(
            result.generate_hooks,
            vec![HookStep::command("composer-dump-autoload", "composer dump-autoload")]
        );
        assert!(result.runtime_inputs.iter().any(|t| t.name() == "composer"));
    }
}
