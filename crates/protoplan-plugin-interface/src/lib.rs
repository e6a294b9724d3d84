//! Stable plugin module contract for protoplan.
//!
//! A plugin module turns the effective configuration and its language's
//! configuration into the runtime tools, compiler flags and hooks needed to
//! generate code. Every builtin language is written against this crate, and
//! external integrations only need to depend on it to be composable.

pub mod config;
pub mod flags;
pub mod plugin;

pub use config::{ConfigTree, ConfigValue, EffectiveConfig};
pub use flags::{option_family, option_flags, output_family, output_flag};
pub use plugin::{HookStep, PluginModule, PluginModuleResult, ToolRef};
