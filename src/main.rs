mod cli;

use proto_plan::config;
use proto_plan::files::FsDiscovery;
use proto_plan::plan::{GenerationPlan, PlanCompiler};
use proto_plan::registry::Registry;
use proto_plan::script::{ScriptAssembler, ShellLogger};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, PlanFormat};
use config::ConfigSources;
use proto_plan::interface::EffectiveConfig;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Set up tracing. `RUST_LOG` wins over `-v`.
///
/// With a log directory, output goes to a daily rolling file and the
/// returned guard must be kept alive until exit.
fn init_logging(
    verbose: u8,
    log_dir: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let Some(logs_dir) = log_dir else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
        return None;
    };

    if let Err(e) = fs::create_dir_all(logs_dir) {
        eprintln!("Warning: Could not create logs directory: {}", e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, "protoplan.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    let registry = Registry::builtin();
    let sources = ConfigSources {
        defaults: cli.defaults.clone(),
        config: cli.config.clone(),
        assignments: cli.assignments.clone(),
        search_from: Some(env::current_dir().context("Failed to read current directory")?),
    };

    match cli.command {
        Commands::Plan { format } => handle_plan(&registry, &sources, format),
        Commands::Script { output } => handle_script(&registry, &sources, output.as_deref()),
        Commands::Options { toml } => handle_options(&registry, &sources, toml),
        Commands::Languages => {
            handle_languages(&registry);
            Ok(())
        }
    }
}

fn load(registry: &Registry, sources: &ConfigSources) -> Result<EffectiveConfig> {
    config::load_effective(&registry.option_schema(), sources)
}

fn compile(registry: &Registry, effective: &EffectiveConfig) -> Result<GenerationPlan> {
    let discovery = FsDiscovery;
    PlanCompiler::new(registry, &discovery)
        .compile(effective)
        .context("Failed to compile generation plan")
}

fn handle_plan(registry: &Registry, sources: &ConfigSources, format: PlanFormat) -> Result<()> {
    let effective = load(registry, sources)?;
    let plan = compile(registry, &effective)?;

    match format {
        PlanFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        PlanFormat::Text => print_plan(&plan),
    }
    Ok(())
}

fn print_plan(plan: &GenerationPlan) {
    if plan.units.is_empty() {
        println!("No languages enabled.");
        return;
    }

    for unit in &plan.units {
        println!("{} -> {}", unit.language, unit.output_path);
        println!("  files: {}", unit.files.join(" "));
        for flag in &unit.protoc_plugins {
            println!("  flag:  {}", flag);
        }
        for hook in &unit.init_hooks {
            println!("  init:  {}", hook.name());
        }
        for hook in &unit.generate_hooks {
            println!("  post:  {}", hook.name());
        }
        if unit.files.is_empty() {
            println!("  (no proto files, will be skipped)");
        }
    }

    let tools: Vec<_> = plan.global_runtime_inputs.iter().map(|t| t.name()).collect();
    println!();
    println!("include: {}", plan.include_paths.join(" "));
    println!("tools:   {}", tools.join(" "));
}

fn handle_script(registry: &Registry, sources: &ConfigSources, output: Option<&Path>) -> Result<()> {
    let effective = load(registry, sources)?;
    let plan = compile(registry, &effective)?;
    let logger = ShellLogger::from_config(&effective);
    let script = ScriptAssembler::new(&logger).assemble(&plan);

    match output {
        Some(path) => {
            fs::write(path, &script)
                .with_context(|| format!("Failed to write script to {:?}", path))?;
            tracing::info!("Wrote generation script to {:?}", path);
        }
        None => print!("{}", script),
    }
    Ok(())
}

fn handle_options(registry: &Registry, sources: &ConfigSources, as_toml: bool) -> Result<()> {
    if as_toml {
        let effective = load(registry, sources)?;
        let table = config::tree_to_toml(effective.tree());
        print!("{}", toml::to_string_pretty(&table)?);
        return Ok(());
    }

    let schema = registry.option_schema();
    for (path, node) in schema.flatten() {
        let default = serde_json::to_string(&node.default_value())?;
        println!("{}", path);
        println!("    type:    {}", node.ty);
        println!("    default: {}", default);
        if !node.description.is_empty() {
            println!("    {}", node.description);
        }
    }
    Ok(())
}

fn handle_languages(registry: &Registry) {
    for spec in registry.languages() {
        println!("{:<8} {}", spec.name, spec.description);
        println!("         modules: {}", spec.module_names().join(", "));
        for rule in &spec.precedence {
            println!("         {} subsumes {}", rule.primary, rule.subsumed);
        }
    }
}
