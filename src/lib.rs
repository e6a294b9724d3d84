//! Resolve layered protobuf generation settings into an executable plan.
//!
//! The pipeline is: option schema → configuration resolver → effective
//! configuration → per-language module composition and file resolution →
//! generation plan → shell script.

pub mod composer;
pub mod config;
pub mod error;
pub mod files;
pub mod languages;
pub mod plan;
pub mod registry;
pub mod schema;
pub mod script;
pub mod utils;

pub use composer::{combine, compose_language};
pub use error::{ConfigError, PlanError};
pub use files::{files_for, FsDiscovery, ProtoDiscovery};
pub use plan::{normalize, GenerationPlan, GenerationUnit, PlanCompiler};
pub use registry::Registry;
pub use script::{ScriptAssembler, ScriptLogger, ShellLogger};

pub use protoplan_plugin_interface as interface;
