//! Documentation via protoc-gen-doc.

use protoplan_plugin_interface::{
    output_flag, ConfigTree, EffectiveConfig, PluginModule, PluginModuleResult,
};

use super::{common_options, output_path, package, LanguageSpec};
use crate::schema::OptionNode;

pub fn spec() -> LanguageSpec {
    let options = common_options("doc", Some("protoc-gen-doc"), &[])
        .option(
            "format",
            OptionNode::enumeration(
                &["html", "markdown", "json", "docbook"],
                "html",
                "Output format of the rendered documentation.",
            ),
        )
        .option(
            "fileName",
            OptionNode::string("index.html", "Name of the rendered file."),
        );

    LanguageSpec {
        name: "doc",
        description: "API documentation via protoc-gen-doc",
        options,
        modules: vec![Box::new(Base)],
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
        let format = local.get_str("format").unwrap_or("html");
        let file_name = local.get_str("fileName").unwrap_or("index.html");

        // protoc-gen-doc reads `<format>,<file>` and then its own parameters
        let mut params = vec![format.to_string(), file_name.to_string()];
        params.extend(local.get_str_list("options"));

        PluginModuleResult::empty()
            .with_runtime_input(package(local, "protoc-gen-doc"))
            .with_plugin(output_flag("doc", &[], output_path(local)))
            .with_plugin(format!("--doc_opt={}", params.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::test_support::scoped;
    use protoplan_plugin_interface::ConfigValue;

    #[test]
    fn test_doc_defaults() {
        let (global, local) = scoped("doc", "docs/api", |l| l);
        assert_eq!(
            Base.evaluate(&global, &local).protoc_plugins,
            vec!["--doc_out=docs/api", "--doc_opt=html,index.html"]
        );
    }

    #[test]
    fn test_markdown_format() {
        let (global, local) = scoped("doc", "docs", |l| {
            l.with("format", "markdown").with("fileName", "api.md")
        });
        assert_eq!(
            Base.evaluate(&global, &local).protoc_plugins[1],
            "--doc_opt=markdown,api.md"
        );
    }

    #[test]
    fn test_user_options_follow_format_and_file() {
        let (global, local) = scoped("doc", "docs", |l| {
            l.with("options", ConfigValue::strings(["source_relative"]))
        });
        assert_eq!(
            Base.evaluate(&global, &local).protoc_plugins,
            vec!["--doc_out=docs", "--doc_opt=html,index.html,source_relative"]
        );
    }
}
