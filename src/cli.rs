use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "protoplan")]
#[command(about = "Compile layered protobuf generation settings into a protoc plan", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project configuration file (default: nearest protoplan.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Package defaults file (default: <config dir>/protoplan/defaults.toml)
    #[arg(long, global = true)]
    pub defaults: Option<PathBuf>,

    /// Override a single option, e.g. --set languages.go.enable=true
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub assignments: Vec<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to a daily rolling file in this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile and print the generation plan
    Plan {
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
    },
    /// Print the generation script
    Script {
        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List every option with its type and default
    Options {
        /// Print the resolved configuration as TOML instead
        #[arg(long)]
        toml: bool,
    },
    /// List registered languages and their modules
    Languages,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Text,
    Json,
}
