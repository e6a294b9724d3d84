//! Go: protoc-gen-go, gRPC, protoc-gen-validate and grpc-gateway.

use protoplan_plugin_interface::{
    option_flags, output_flag, ConfigTree, EffectiveConfig, PluginModule, PluginModuleResult,
};

use super::{common_options, feature_options, output_path, package, section, LanguageSpec, Precedence};
use crate::schema::OptionNode;

const GO_PACKAGE: &str = "protoc-gen-go";

pub fn spec() -> LanguageSpec {
    let options = common_options("go", Some(GO_PACKAGE), &["paths=source_relative"])
        .tree(
            "grpc",
            feature_options("Generate gRPC service stubs.", Some("protoc-gen-go-grpc"))
                .option(
                    "options",
                    OptionNode::strings(&["paths=source_relative"], "Parameters for the gRPC generator."),
                )
                .option(
                    "legacyPlugin",
                    OptionNode::bool(
                        false,
                        "Emit stubs through protoc-gen-go's deprecated plugins=grpc mode.",
                    ),
                ),
        )
        .tree(
            "validate",
            feature_options("Generate protoc-gen-validate validators.", Some("protoc-gen-validate"))
                .option("options", OptionNode::strings(&[], "Parameters for protoc-gen-validate.")),
        )
        .tree(
            "gateway",
            feature_options("Generate grpc-gateway reverse proxies.", Some("protoc-gen-grpc-gateway"))
                .option(
                    "options",
                    OptionNode::strings(&["paths=source_relative"], "Parameters for grpc-gateway."),
                )
                .option("openapi", OptionNode::bool(false, "Also emit OpenAPI v2 definitions."))
                .option(
                    "openapiPackage",
                    OptionNode::reference("protoc-gen-openapiv2", "OpenAPI v2 generator executable."),
                ),
        );

    LanguageSpec {
        name: "go",
        description: "Go messages via protoc-gen-go",
        options,
        modules: vec![Box::new(Base), Box::new(Grpc), Box::new(Validate), Box::new(Gateway)],
        // plugins=grpc rewrites the base generator's own --go_out flag
        precedence: vec![Precedence {
            primary: "grpc",
            subsumed: "base",
        }],
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
            .with_runtime_input(package(local, GO_PACKAGE))
            .with_plugin(output_flag("go", &[], output_path(local)))
            .with_plugins(option_flags("go", &local.get_str_list("options")))
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
        let path = output_path(local);
        let options = grpc.get_str_list("options");

        // the legacy flag replaces base's flags, so it carries base's options too
        if grpc.get_bool("legacyPlugin") {
            let mut params = vec!["plugins=grpc".to_string()];
            for param in local.get_str_list("options").into_iter().chain(options) {
                if !params.contains(&param) {
                    params.push(param);
                }
            }
            return PluginModuleResult::empty()
                .with_runtime_input(package(local, GO_PACKAGE))
                .with_plugin(output_flag("go", &params, path));
        }

        PluginModuleResult::empty()
            .with_runtime_input(package(grpc, "protoc-gen-go-grpc"))
            .with_plugin(output_flag("go-grpc", &[], path))
            .with_plugins(option_flags("go-grpc", &options))
    }
}

#[derive(Debug)]
struct Validate;

impl PluginModule for Validate {
    fn name(&self) -> &str {
        "validate"
    }

    fn section(&self) -> Option<&str> {
        Some("validate")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let validate = section(local, "validate");
        let mut params = vec!["lang=go".to_string()];
        params.extend(validate.get_str_list("options"));

        PluginModuleResult::empty()
            .with_runtime_input(package(validate, "protoc-gen-validate"))
            .with_plugin(output_flag("validate", &params, output_path(local)))
    }
}

#[derive(Debug)]
struct Gateway;

impl PluginModule for Gateway {
    fn name(&self) -> &str {
        "gateway"
    }

    fn section(&self) -> Option<&str> {
        Some("gateway")
    }

    fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
        let gateway = section(local, "gateway");
        let path = output_path(local);

        let result = PluginModuleResult::empty()
            .with_runtime_input(package(gateway, "protoc-gen-grpc-gateway"))
            .with_plugin(output_flag("grpc-gateway", &[], path))
            .with_plugins(option_flags("grpc-gateway", &gateway.get_str_list("options")));

        if !gateway.get_bool("openapi") {
            return result;
        }

        let openapi = gateway.get_str("openapiPackage").unwrap_or("protoc-gen-openapiv2");
        result
            .with_runtime_input(openapi)
            .with_plugin(output_flag("openapiv2", &[], path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::{enable, scoped};
    use pretty_assertions::assert_eq;
    use protoplan_plugin_interface::ConfigValue;

    #[test]
    fn test_base_flags() {
        let (global, local) = scoped("go", "gen/go", |l| l);
        let result = Base.evaluate(&global, &local);
        assert_eq!(
            result.protoc_plugins,
            vec!["--go_out=gen/go", "--go_opt=paths=source_relative"]
        );
        assert_eq!(result.runtime_inputs[0].name(), "protoc-gen-go");
    }

    #[test]
    fn test_grpc_uses_go_grpc_plugin() {
        let (global, local) = scoped("go", "gen/go", |l| enable(l, "grpc"));
        let result = Grpc.evaluate(&global, &local);
        assert_eq!(
            result.protoc_plugins,
            vec!["--go-grpc_out=gen/go", "--go-grpc_opt=paths=source_relative"]
        );
        assert_eq!(result.runtime_inputs[0].name(), "protoc-gen-go-grpc");
    }

    #[test]
    fn test_legacy_grpc_emits_go_out() {
        let (global, local) = scoped("go", "gen/go", |l| {
            let l = enable(l, "grpc");
            let grpc = l.tree("grpc").cloned().unwrap().with("legacyPlugin", true);
            l.with("grpc", grpc)
        });
        let result = Grpc.evaluate(&global, &local);
        assert_eq!(
            result.protoc_plugins,
            vec!["--go_out=plugins=grpc,paths=source_relative:gen/go"]
        );
    }

    #[test]
    fn test_legacy_grpc_merges_language_and_grpc_options() {
        let (global, local) = scoped("go", "gen/go", |l| {
            let l = enable(l, "grpc");
            let grpc = l
                .tree("grpc")
                .cloned()
                .unwrap()
                .with("legacyPlugin", true)
                .with("options", ConfigValue::strings(["paths=source_relative", "require_unimplemented_servers=false"]));
            l.with("options", ConfigValue::strings(["paths=source_relative", "module=example.com/api"]))
                .with("grpc", grpc)
        });
        let result = Grpc.evaluate(&global, &local);
        assert_eq!(
            result.protoc_plugins,
            vec!["--go_out=plugins=grpc,paths=source_relative,module=example.com/api,require_unimplemented_servers=false:gen/go"]
        );
    }

    #[test]
    fn test_validate_inline_params() {
        let (global, local) = scoped("go", "pkg/proto", |l| enable(l, "validate"));
        let result = Validate.evaluate(&global, &local);
        assert_eq!(result.protoc_plugins, vec!["--validate_out=lang=go:pkg/proto"]);
    }

    #[test]
    fn test_gateway_with_openapi() {
        let (global, local) = scoped("go", "gen/go", |l| {
            let l = enable(l, "gateway");
            let gateway = l.tree("gateway").cloned().unwrap().with("openapi", true);
            l.with("gateway", gateway)
        });
        let result = Gateway.evaluate(&global, &local);
        assert_eq!(
            result.protoc_plugins,
            vec![
                "--grpc-gateway_out=gen/go",
                "--grpc-gateway_opt=paths=source_relative",
                "--openapiv2_out=gen/go",
            ]
        );
        assert_eq!(result.runtime_inputs.len(), 2);
    }
}
