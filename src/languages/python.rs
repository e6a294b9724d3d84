//! Python: builtin generator, grpcio stubs and mypy type stubs.

use protoplan_plugin_interface::{
    option_flags, output_flag, ConfigTree, EffectiveConfig, HookStep, PluginModule,
    PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec};
use crate::schema::OptionNode;
use crate::script::quote_arg;

pub fn spec() -> LanguageSpec {
    let options = common_options("python", None, &[])
        .option(
            "generateInitFiles",
            OptionNode::bool(true, "Create __init__.py in every generated package directory."),
        )
        .tree(
            "grpc",
            feature_options("Generate grpcio service stubs.", Some("grpc_python_plugin")),
        )
        .tree(
            "mypy",
            feature_options("Generate mypy type stubs.", Some("protoc-gen-mypy")).option(
                "grpcPackage",
                OptionNode::reference("protoc-gen-mypy_grpc", "Stub generator for gRPC services."),
            ),
        );

    LanguageSpec {
        name: "python",
        description: "Python messages via protoc's builtin generator",
        options,
        modules: vec![Box::new(Base), Box::new(Grpc), Box::new(Mypy)],
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
            .with_plugin(output_flag("python", &[], path))
            .with_plugins(option_flags("python", &local.get_str_list("options")));

        if !local.get_bool("generateInitFiles") {
            return result;
        }

        result.with_generate_hook(HookStep::command(
            "init-py",
            format!(
                "find {} -type d -exec touch {{}}/__init__.py \\;",
                quote_arg(path)
            ),
        ))
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
        let plugin = package(section(local, "grpc"), "grpc_python_plugin");
        PluginModuleResult::empty()
            .with_runtime_input(plugin)
            .with_plugin(format!("--plugin=protoc-gen-grpc_python={}", plugin))
            .with_plugin(output_flag("grpc_python", &[], output_path(local)))
    }
}

#[derive(Debug)]
struct Mypy;

impl PluginModule for Mypy {
    fn name(&self) -> &str {
        "mypy"
    }

    fn section(&self) -> Option<&str> {
        Some("mypy")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let mypy = section(local, "mypy");
        let path = output_path(local);
        let result = PluginModuleResult::empty()
            .with_runtime_input(package(mypy, "protoc-gen-mypy"))
            .with_plugin(output_flag("mypy", &[], path));

        if !Grpc.is_enabled(local) {
            return result;
        }

        result
            .with_runtime_input(mypy.get_str("grpcPackage").unwrap_or("protoc-gen-mypy_grpc"))
            .with_plugin(output_flag("mypy_grpc", &[], path))
    }
}
