//! The plugin module trait and the result every module returns.
//!
//! Each feature of each language (base generator, gRPC, validation, gateway,
//! framework integration, documentation) is a [`PluginModule`]. All modules
//! return the same four-field [`PluginModuleResult`], so the host can combine
//! them without knowing which kind of module it is dealing with.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ConfigTree, EffectiveConfig};

/// Reference to an executable that must be available when the plan runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolRef(String);

impl ToolRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single named step run before or after the compiler.
///
/// Hooks stay structured until the script is assembled; only the host's
/// script assembler turns them into shell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookStep {
    /// Create a directory (and its parents) if absent.
    CreateDir { path: String },
    /// Run a shell command.
    Command { name: String, command: String },
}

impl HookStep {
    pub fn create_dir(path: impl Into<String>) -> Self {
        HookStep::CreateDir { path: path.into() }
    }

    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        HookStep::Command {
            name: name.into(),
            command: command.into(),
        }
    }

    /// Human-readable step name, used for logging.
    pub fn name(&self) -> &str {
        match self {
            HookStep::CreateDir { .. } => "create-dir",
            HookStep::Command { name, .. } => name,
        }
    }
}

/// What a plugin module contributes to one generation unit.
///
/// The all-empty value is the identity for [`PluginModuleResult::append`]:
/// a disabled module returns it and composing with it changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginModuleResult {
    /// Tools needed at run time (order kept, duplicates allowed).
    pub runtime_inputs: Vec<ToolRef>,
    /// Compiler flag fragments, in emission order.
    pub protoc_plugins: Vec<String>,
    /// Steps run before the compiler.
    pub init_hooks: Vec<HookStep>,
    /// Steps run after the compiler.
    pub generate_hooks: Vec<HookStep>,
}

impl PluginModuleResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.runtime_inputs.is_empty()
            && self.protoc_plugins.is_empty()
            && self.init_hooks.is_empty()
            && self.generate_hooks.is_empty()
    }

    /// Append another result after this one, field by field.
    pub fn append(&mut self, other: PluginModuleResult) {
        self.runtime_inputs.extend(other.runtime_inputs);
        self.protoc_plugins.extend(other.protoc_plugins);
        self.init_hooks.extend(other.init_hooks);
        self.generate_hooks.extend(other.generate_hooks);
    }

    pub fn with_runtime_input(mut self, tool: impl Into<String>) -> Self {
        self.runtime_inputs.push(ToolRef::new(tool));
        self
    }

    pub fn with_plugin(mut self, flag: impl Into<String>) -> Self {
        self.protoc_plugins.push(flag.into());
        self
    }

    pub fn with_plugins<I>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.protoc_plugins.extend(flags);
        self
    }

    pub fn with_init_hook(mut self, step: HookStep) -> Self {
        self.init_hooks.push(step);
        self
    }

    pub fn with_generate_hook(mut self, step: HookStep) -> Self {
        self.generate_hooks.push(step);
        self
    }
}

/// A composable unit of code generation for one language feature.
///
/// `evaluate` receives the effective configuration and the configuration of
/// the module's language (`languages.<name>`). By the time a module is
/// evaluated, the language's `outputPath` is always a single string.
///
/// # Example (for module implementors)
///
/// ```
/// use protoplan_plugin_interface::{
///     output_flag, ConfigTree, EffectiveConfig, PluginModule, PluginModuleResult,
/// };
///
/// #[derive(Debug)]
/// struct Swift;
///
/// impl PluginModule for Swift {
///     fn name(&self) -> &str {
///         "swift"
///     }
///
///     fn evaluate(&self, _global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult {
///         let path = local.get_str("outputPath").unwrap_or_default();
///         PluginModuleResult::empty()
///             .with_runtime_input("protoc-gen-swift")
///             .with_plugin(output_flag("swift", &[], path))
///     }
/// }
/// ```
pub trait PluginModule: Send + Sync + fmt::Debug {
    /// Module name, unique within its language.
    fn name(&self) -> &str;

    /// Key of the module's own subtree within the language configuration.
    ///
    /// `None` means the module is the language's base generator and is
    /// governed by the language's own `enable` flag.
    fn section(&self) -> Option<&str> {
        None
    }

    /// Whether the module is switched on in the language configuration.
    fn is_enabled(&self, local: &ConfigTree) -> bool {
        match self.section() {
            Some(key) => local.tree(key).is_some_and(|s| s.get_bool("enable")),
            None => local.get_bool("enable"),
        }
    }

    /// Compute the module's contribution. Only called for enabled modules.
    fn evaluate(&self, global: &EffectiveConfig, local: &ConfigTree) -> PluginModuleResult;
}
