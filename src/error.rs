//! Errors raised while resolving configuration and compiling a plan.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error in a configuration layer. Fatal: no effective config is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A key that is not declared anywhere in the option schema.
    UnknownOption { path: String },
    /// A value whose kind does not match the declared option type.
    TypeMismatch {
        path: String,
        expected: String,
        found: &'static str,
    },
}

impl ConfigError {
    /// Dotted path of the offending key.
    pub fn path(&self) -> &str {
        match self {
            ConfigError::UnknownOption { path } | ConfigError::TypeMismatch { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownOption { path } => write!(f, "unknown option '{}'", path),
            ConfigError::TypeMismatch {
                path,
                expected,
                found,
            } => write!(f, "{}: expected {}, got {}", path, expected, found),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error while compiling a generation plan. Fatal: no partial plan is produced.
#[derive(Debug)]
pub enum PlanError {
    /// The configuration layers did not resolve.
    Config(ConfigError),
    /// Two modules of one language emit an output flag for the same plugin
    /// family and no precedence rule decides between them.
    CompositionConflict {
        language: String,
        output_path: String,
        family: String,
        first: String,
        second: String,
    },
    /// A module set was evaluated against a language whose `outputPath` is
    /// not a single string.
    UnscopedOutputPath { language: String },
    /// Proto discovery failed for a reason other than a missing directory.
    Discovery { dir: PathBuf, source: io::Error },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Config(err) => write!(f, "invalid configuration: {}", err),
            PlanError::CompositionConflict {
                language,
                output_path,
                family,
                first,
                second,
            } => write!(
                f,
                "{}: modules '{}' and '{}' both emit --{}_out for output path '{}' and no precedence rule applies",
                language, first, second, family, output_path
            ),
            PlanError::UnscopedOutputPath { language } => write!(
                f,
                "{}: outputPath must be a single path when composing modules",
                language
            ),
            PlanError::Discovery { dir, source } => {
                write!(f, "failed to discover proto files in {}: {}", dir.display(), source)
            }
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::Config(err) => Some(err),
            PlanError::Discovery { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for PlanError {
    fn from(err: ConfigError) -> Self {
        PlanError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_carry_full_path() {
        let unknown = ConfigError::UnknownOption {
            path: "languages.go.grcp.enable".to_string(),
        };
        assert_eq!(unknown.to_string(), "unknown option 'languages.go.grcp.enable'");
        assert_eq!(unknown.path(), "languages.go.grcp.enable");

        let mismatch = ConfigError::TypeMismatch {
            path: "languages.go.enable".to_string(),
            expected: "bool".to_string(),
            found: "string",
        };
        assert_eq!(mismatch.to_string(), "languages.go.enable: expected bool, got string");
    }

    #[test]
    fn test_conflict_message_names_both_modules() {
        let err = PlanError::CompositionConflict {
            language: "go".to_string(),
            output_path: "gen/go".to_string(),
            family: "go".to_string(),
            first: "base".to_string(),
            second: "grpc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'base'"));
        assert!(msg.contains("'grpc'"));
        assert!(msg.contains("--go_out"));
        assert!(msg.contains("gen/go"));
    }
}
