//! Java: builtin generator and grpc-java.

use protoplan_plugin_interface::{
    output_flag, ConfigTree, EffectiveConfig, PluginModule, PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec};

pub fn spec() -> LanguageSpec {
    let options = common_options("java", None, &[]).tree(
        "grpc",
        feature_options("Generate grpc-java service stubs.", Some("protoc-gen-grpc-java")),
    );

    LanguageSpec {
        name: "java",
        description: "Java messages via protoc's builtin generator",
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
            .with_plugin(output_flag("java", &local.get_str_list("options"), output_path(local)))
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
        let plugin = package(section(local, "grpc"), "protoc-gen-grpc-java");
        PluginModuleResult::empty()
            .with_runtime_input(plugin)
            .with_plugin(format!("--plugin=protoc-gen-grpc-java={}", plugin))
            .with_plugin(output_flag("grpc-java", &[], output_path(local)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::{enable, scoped};

    #[test]
    fn test_grpc_java_flags() {
        let (global, local) = scoped("java", "src/main/java", |l| enable(l, "grpc"));
        assert_eq!(
            Base.evaluate(&global, &local).protoc_plugins,
            vec!["--java_out=src/main/java"]
        );
        assert_eq!(
            Grpc.evaluate(&global, &local).protoc_plugins,
            vec![
                "--plugin=protoc-gen-grpc-java=protoc-gen-grpc-java",
                "--grpc-java_out=src/main/java",
            ]
        );
    }
}
