//! Static registry of languages.
//!
//! Languages are looked up by name from a table fixed at compile time; the
//! registry also assembles the full option schema from the global options
//! and every language's subtree.

use crate::languages::{LanguageSpec, BUILTIN};
use crate::schema::{OptionNode, OptionSchema};

#[derive(Debug)]
pub struct Registry {
    languages: Vec<LanguageSpec>,
}

impl Registry {
    /// All builtin languages, in declaration order.
    pub fn builtin() -> Self {
        Self::new(BUILTIN.iter().map(|ctor| ctor()).collect())
    }

    pub fn new(languages: Vec<LanguageSpec>) -> Self {
        Self { languages }
    }

    pub fn languages(&self) -> &[LanguageSpec] {
        &self.languages
    }

    pub fn get(&self, name: &str) -> Option<&LanguageSpec> {
        self.languages.iter().find(|l| l.name == name)
    }

    /// The complete schema: global options plus `languages.<name>` for every
    /// registered language.
    pub fn option_schema(&self) -> OptionSchema {
        let languages = self
            .languages
            .iter()
            .fold(OptionSchema::new(), |schema, lang| {
                schema.tree(lang.name, lang.options.clone())
            });

        global_options().tree("languages", languages)
    }
}

fn global_options() -> OptionSchema {
    OptionSchema::new()
        .option(
            "root",
            OptionNode::string(".", "Project root, searched for protos when nothing else is set."),
        )
        .tree(
            "protoc",
            OptionSchema::new()
                .option("package", OptionNode::reference("protoc", "The protobuf compiler."))
                .option("files", OptionNode::strings(&[], "Files compiled for every language."))
                .option(
                    "sourceDirectories",
                    OptionNode::strings(&[], "Directories searched for .proto files."),
                )
                .option(
                    "includeDirectories",
                    OptionNode::strings(
                        &[],
                        "Include paths. Empty falls back to sourceDirectories, then root.",
                    ),
                ),
        )
        .tree(
            "debug",
            OptionSchema::new()
                .option("enable", OptionNode::bool(false, "Print progress messages."))
                .option("level", OptionNode::int(1, "Verbosity of progress messages, 1 to 3."))
                .option("trace", OptionNode::bool(false, "Echo every command before it runs."))
                .option("timing", OptionNode::bool(false, "Time each compiler invocation.")),
        )
}
