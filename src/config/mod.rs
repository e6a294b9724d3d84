pub mod loader;
pub mod resolver;

pub use loader::{
    load_effective, load_layer, parse_assignment, parse_layer, tree_to_toml, ConfigSources,
};
pub use resolver::{deep_merge, extract_defaults, extract_defaults_at, resolve, validate_layer};
