//! Rendering a generation plan as a bash script.
//!
//! This is the only place where hook steps and compiler flags become shell
//! text. Units run strictly in plan order.

use protoplan_plugin_interface::{EffectiveConfig, HookStep};
use std::fmt::Write as _;

use crate::plan::{GenerationPlan, GenerationUnit};

/// Quote `arg` for the shell, leaving it bare when it only contains safe
/// characters.
pub fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '=' | ':' | ',' | '+' | '@' | '%' | '-')
        });
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Progress and diagnostics hooks used while assembling a script.
///
/// Each method returns shell text to splice into the script, or `None` when
/// nothing should be emitted.
pub trait ScriptLogger {
    /// A progress message at `level` (1 is least verbose).
    fn log(&self, level: u8, message: &str) -> Option<String>;

    /// A line that announces `command` before it runs.
    fn trace_command(&self, command: &str) -> Option<String>;

    /// `command`, possibly wrapped. The exit status must be preserved.
    fn time_command(&self, command: String) -> String;
}

/// Logger writing to stderr of the generated script, configured by the
/// `debug` options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellLogger {
    pub enable: bool,
    pub level: u8,
    pub trace: bool,
    pub timing: bool,
}

impl ShellLogger {
    pub fn from_config(effective: &EffectiveConfig) -> Self {
        let debug = effective.tree().tree("debug");
        let flag = |key: &str| debug.is_some_and(|d| d.get_bool(key));
        let level = debug
            .and_then(|d| d.get_int("level"))
            .unwrap_or(1)
            .clamp(1, 3) as u8;

        Self {
            enable: flag("enable"),
            level,
            trace: flag("trace"),
            timing: flag("timing"),
        }
    }
}

impl ScriptLogger for ShellLogger {
    fn log(&self, level: u8, message: &str) -> Option<String> {
        (self.enable && level <= self.level).then(|| format!("echo {} >&2", quote_arg(message)))
    }

    fn trace_command(&self, command: &str) -> Option<String> {
        self.trace
            .then(|| format!("echo {} >&2", quote_arg(&format!("+ {}", command))))
    }

    fn time_command(&self, command: String) -> String {
        if self.timing {
            format!("time {}", command)
        } else {
            command
        }
    }
}

pub struct ScriptAssembler<'a> {
    logger: &'a dyn ScriptLogger,
}

impl<'a> ScriptAssembler<'a> {
    pub fn new(logger: &'a dyn ScriptLogger) -> Self {
        Self { logger }
    }

    pub fn assemble(&self, plan: &GenerationPlan) -> String {
        let mut script = String::from("#!/usr/bin/env bash\nset -euo pipefail\n");

        let tools: Vec<_> = plan
            .global_runtime_inputs
            .iter()
            .map(|t| t.name())
            .collect();
        let _ = writeln!(script, "# requires: {}", tools.join(" "));

        for unit in &plan.units {
            script.push('\n');
            self.unit(&mut script, plan, unit);
        }
        script
    }

    fn unit(&self, script: &mut String, plan: &GenerationPlan, unit: &GenerationUnit) {
        let status = format!(
            "Generating {} code for output path: {}",
            unit.language, unit.output_path
        );
        let _ = writeln!(script, "echo {}", quote_arg(&status));

        if unit.files.is_empty() {
            tracing::warn!(
                language = unit.language.as_str(),
                output_path = unit.output_path.as_str(),
                "Skipping unit without proto files"
            );
            let warning = format!(
                "warning: no proto files for {} ({}), skipping",
                unit.language, unit.output_path
            );
            let _ = writeln!(script, "echo {} >&2", quote_arg(&warning));
            return;
        }

        self.step(script, &HookStep::create_dir(unit.output_path.as_str()));
        for hook in &unit.init_hooks {
            self.step(script, hook);
        }

        let mut args = vec![plan.compiler.name().to_string()];
        args.extend(plan.include_paths.iter().map(|inc| format!("-I{}", inc)));
        args.extend(unit.protoc_plugins.iter().cloned());
        args.extend(unit.files.iter().cloned());
        let invocation = args.iter().map(|a| quote_arg(a)).collect::<Vec<_>>().join(" ");

        self.emit_log(
            script,
            1,
            &format!("compiling {} into {}", unit.language, unit.output_path),
        );
        self.emit_log(script, 3, &format!("{} files", unit.files.len()));
        if let Some(trace) = self.logger.trace_command(&invocation) {
            let _ = writeln!(script, "{}", trace);
        }
        let _ = writeln!(script, "{}", self.logger.time_command(invocation));

        for hook in &unit.generate_hooks {
            self.step(script, hook);
        }
        self.emit_log(
            script,
            1,
            &format!("finished {} into {}", unit.language, unit.output_path),
        );
    }

    fn step(&self, script: &mut String, step: &HookStep) {
        let command = match step {
            HookStep::CreateDir { path } => format!("mkdir -p {}", quote_arg(path)),
            HookStep::Command { command, .. } => command.clone(),
        };

        self.emit_log(script, 2, &format!("running {}", step.name()));
        if let Some(trace) = self.logger.trace_command(&command) {
            let _ = writeln!(script, "{}", trace);
        }
        let _ = writeln!(script, "{}", command);
    }

    fn emit_log(&self, script: &mut String, level: u8, message: &str) {
        if let Some(line) = self.logger.log(level, message) {
            let _ = writeln!(script, "{}", line);
        }
    }
}
