//! JavaScript: protoc-gen-js and grpc-web.

use protoplan_plugin_interface::{
    output_flag, ConfigTree, EffectiveConfig, PluginModule, PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec};
use crate::schema::OptionNode;

pub fn spec() -> LanguageSpec {
    let options = common_options("js", Some("protoc-gen-js"), &["import_style=commonjs", "binary"])
        .tree(
            "grpcWeb",
            feature_options("Generate grpc-web clients.", Some("protoc-gen-grpc-web"))
                .option(
                    "importStyle",
                    OptionNode::enumeration(
                        &["closure", "commonjs", "commonjs+dts", "typescript"],
                        "commonjs",
                        "Import style of the generated client.",
                    ),
                )
                .option(
                    "mode",
                    OptionNode::enumeration(
                        &["grpcwebtext", "grpcweb"],
                        "grpcwebtext",
                        "Wire format used by the client.",
                    ),
                ),
        );

    LanguageSpec {
        name: "js",
        description: "JavaScript messages via protoc-gen-js",
        options,
        modules: vec![Box::new(Base), Box::new(GrpcWeb)],
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
        // protoc-gen-js only reads inline parameters
        PluginModuleResult::empty()
            .with_runtime_input(package(local, "protoc-gen-js"))
            .with_plugin(output_flag("js", &local.get_str_list("options"), output_path(local)))
    }
}

#[derive(Debug)]
struct GrpcWeb;

impl PluginModule for GrpcWeb {
    fn name(&self) -> &str {
        "grpc-web"
    }

    fn section(&self) -> Option<&str> {
        Some("grpcWeb")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let grpc_web = section(local, "grpcWeb");
        let params = vec![
            format!("import_style={}", grpc_web.get_str("importStyle").unwrap_or("commonjs")),
            format!("mode={}", grpc_web.get_str("mode").unwrap_or("grpcwebtext")),
        ];

        PluginModuleResult::empty()
            .with_runtime_input(package(grpc_web, "protoc-gen-grpc-web"))
            .with_plugin(output_flag("grpc-web", &params, output_path(local)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::{enable, scoped};

    #[test]
    fn test_base_inline_options() {
        let (global, local) = scoped("js", "web/gen", |l| l);
        assert_eq!(
            Base.evaluate(&global, &local).protoc_plugins,
            vec!["--js_out=import_style=commonjs,binary:web/gen"]
        );
    }

    #[test]
    fn test_grpc_web_params() {
        let (global, local) = scoped("js", "web/gen", |l| {
            let l = enable(l, "grpcWeb");
            let section = l
                .tree("grpcWeb")
                .cloned()
                .unwrap()
                .with("importStyle", "typescript")
                .with("mode", "grpcweb");
            l.with("grpcWeb", section)
        });
        assert_eq!(
            GrpcWeb.evaluate(&global, &local).protoc_plugins,
            vec!["--grpc-web_out=import_style=typescript,mode=grpcweb:web/gen"]
        );
    }
}
