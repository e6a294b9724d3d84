//! C++: builtin generator and grpc_cpp_plugin.

use protoplan_plugin_interface::{
    output_flag, ConfigTree, EffectiveConfig, PluginModule, PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec};

pub fn spec() -> LanguageSpec {
    let options = common_options("cpp", None, &[]).tree(
        "grpc",
        feature_options("Generate gRPC service stubs.", Some("grpc_cpp_plugin")),
    );

    LanguageSpec {
        name: "cpp",
        description: "C++ messages via protoc's builtin generator",
        options,
        modules: vec![Box::new(Base), Box::new(Grpc)],
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
            .with_plugin(output_flag("cpp", &local.get_str_list("options"), output_path(local)))
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
        let plugin = package(section(local, "grpc"), "grpc_cpp_plugin");
        PluginModuleResult::empty()
            .with_runtime_input(plugin)
            .with_plugin(format!("--plugin=protoc-gen-grpc={}", plugin))
            .with_plugin(output_flag("grpc", &[], output_path(local)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::{enable, scoped};
    use protoplan_plugin_interface::ConfigValue;

    #[test]
    fn test_base_with_lite_option() {
        let (global, local) = scoped("cpp", "gen/cpp", |l| {
            l.with("options", ConfigValue::strings(["lite"]))
        });
        let result = Base.evaluate(&global, &local);
        assert_eq!(result.protoc_plugins, vec!["--cpp_out=lite:gen/cpp"]);
        assert!(result.runtime_inputs.is_empty());
    }

    #[test]
    fn test_grpc_plugin() {
        let (global, local) = scoped("cpp", "gen/cpp", |l| enable(l, "grpc"));
        assert_eq!(
            Grpc.evaluate(&global, &local).protoc_plugins,
            vec!["--plugin=protoc-gen-grpc=grpc_cpp_plugin", "--grpc_out=gen/cpp"]
        );
    }
}
