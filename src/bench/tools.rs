//! External tool invocation
//!
//! Converters, the timing tool and version probes are all plain child
//! processes. Only their exit status and standard output are interpreted.

use crate::config::CommandEntry;
use crate::ToolError;
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Checks that `tool` is installed by running `<tool> --version`
///
/// # Returns
///
/// * `Ok(())` - The tool ran and exited successfully
/// * `Err(ToolError::Missing)` - The tool is absent or rejected `--version`
pub async fn check_tool(tool: &str) -> Result<(), ToolError> {
    let status = Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => {
            tracing::debug!("Found {}", tool);
            Ok(())
        }
        Ok(status) => {
            tracing::debug!("{} --version exited with {}", tool, status);
            Err(ToolError::Missing {
                tool: tool.to_string(),
            })
        }
        Err(e) => {
            tracing::debug!("Failed to spawn {}: {}", tool, e);
            Err(ToolError::Missing {
                tool: tool.to_string(),
            })
        }
    }
}

/// Checks every tool in order, stopping at the first missing one
pub async fn check_tools(tools: &[String]) -> Result<(), ToolError> {
    for tool in tools {
        check_tool(tool).await?;
    }
    Ok(())
}

/// Runs `program` with `args` and returns its standard output
///
/// # Returns
///
/// * `Ok(String)` - Standard output of a successful run
/// * `Err(ToolError::Missing)` - The program does not exist
/// * `Err(ToolError::Failed)` - The program exited unsuccessfully
/// * `Err(ToolError::Spawn)` - The program could not be started for another reason
pub async fn run_program<I, S>(program: &str, args: I) -> Result<String, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    run(program, command).await
}

/// Runs a command line through the platform shell
///
/// `name` identifies the command in errors and logs.
pub async fn run_shell(name: &str, command_line: &str) -> Result<String, ToolError> {
    tracing::debug!("Running {}: {}", name, command_line);
    run(name, shell_command(command_line)).await
}

/// Runs a version probe and extracts the version string
pub async fn tool_version(entry: &CommandEntry) -> Result<String, ToolError> {
    let output = run_shell(&entry.name, &entry.command).await?;
    Ok(parse_version(&output))
}

/// Pulls a version out of typical `--version` output
///
/// Uses the first line; `"hyperfine 1.18.0"` yields `"1.18.0"` and a bare
/// `"1.1.4"` is returned as is.
pub fn parse_version(output: &str) -> String {
    let first_line = output.lines().next().unwrap_or("").trim();
    let mut words = first_line.split_whitespace();
    match (words.next(), words.next()) {
        (Some(_), Some(version)) => version.to_string(),
        (Some(only), None) => only.to_string(),
        _ => String::new(),
    }
}

fn shell_command(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(command_line);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(command_line);
        command
    }
}

async fn run(name: &str, mut command: Command) -> Result<String, ToolError> {
    let output = command
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ToolError::Missing {
                    tool: name.to_string(),
                }
            } else {
                ToolError::Spawn {
                    tool: name.to_string(),
                    source,
                }
            }
        })?;

    into_stdout(name, output)
}

fn into_stdout(name: &str, output: Output) -> Result<String, ToolError> {
    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: name.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
