//! Timing runs through hyperfine

use crate::bench::tools::run_program;
use crate::config::{BenchConfig, CommandEntry};
use crate::ToolError;

/// Program used for timing
pub const HYPERFINE: &str = "hyperfine";

/// One hyperfine invocation over a set of converter commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingPlan {
    pub warmup: u32,
    pub runs: u32,
    pub commands: Vec<CommandEntry>,
}

impl TimingPlan {
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            warmup: config.warmup,
            runs: config.runs,
            commands: config.commands.clone(),
        }
    }

    /// Arguments passed to hyperfine, commands last
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--warmup".to_string(),
            self.warmup.to_string(),
            "--runs".to_string(),
            self.runs.to_string(),
        ];
        for entry in &self.commands {
            args.push("--command-name".to_string());
            args.push(entry.name.clone());
        }
        args.extend(self.commands.iter().map(|entry| entry.command.clone()));
        args
    }

    /// Shell-style rendering for the report, one command per line
    pub fn display(&self) -> String {
        let mut lines = vec![format!(
            "{} --warmup {} --runs {}",
            HYPERFINE, self.warmup, self.runs
        )];
        lines.extend(
            self.commands
                .iter()
                .map(|entry| format!("'{}'", entry.command)),
        );
        lines.join(" \\\n")
    }

    /// Runs hyperfine and returns its textual report
    pub async fn run(&self) -> Result<String, ToolError> {
        tracing::info!(
            "Benchmarking {} commands ({} warmup, {} runs)",
            self.commands.len(),
            self.warmup,
            self.runs
        );
        run_program(HYPERFINE, self.args()).await
    }
}
