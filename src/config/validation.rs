use crate::config::types::{BenchConfig, CommandEntry, Config, ConvertConfig, HarvestConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_convert_config(&config.convert)?;
    validate_bench_config(&config.bench)?;
    Ok(())
}

/// Validates page harvesting configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed-url '{}': {}", config.seed_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' must use http or https",
            config.seed_url
        )));
    }

    if config.page_count < 1 {
        return Err(ConfigError::Validation(
            "page-count must be >= 1, got 0".to_string(),
        ));
    }

    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "harvest output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates batch conversion configuration
fn validate_convert_config(config: &ConvertConfig) -> Result<(), ConfigError> {
    if config.program.trim().is_empty() {
        return Err(ConfigError::Validation(
            "convert program cannot be empty".to_string(),
        ));
    }

    if config.concurrency < 1 || config.concurrency > 256 {
        return Err(ConfigError::Validation(format!(
            "convert concurrency must be between 1 and 256, got {}",
            config.concurrency
        )));
    }

    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "convert output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates benchmark configuration
fn validate_bench_config(config: &BenchConfig) -> Result<(), ConfigError> {
    if config.runs < 1 {
        return Err(ConfigError::Validation(
            "bench runs must be >= 1, got 0".to_string(),
        ));
    }

    if config.report_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    if config.commands.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[bench.command]] is required".to_string(),
        ));
    }

    for entry in config.commands.iter().chain(&config.versions) {
        validate_command_entry(entry)?;
    }

    for tool in &config.required_tools {
        if tool.trim().is_empty() || tool.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "required tool '{}' must be a single program name",
                tool
            )));
        }
    }

    Ok(())
}

/// Validates a named command
fn validate_command_entry(entry: &CommandEntry) -> Result<(), ConfigError> {
    if entry.name.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "command '{}' has an empty name",
            entry.command
        )));
    }

    if entry.command.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "command '{}' has an empty command line",
            entry.name
        )));
    }

    Ok(())
}
