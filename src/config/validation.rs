use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;

/// Upper bound on the worker pool size
const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_workers
        )));
    }

    if config.chunk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be >= 1, got {}",
            config.chunk_size
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(language) = &config.language {
        validate_language_code(language)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if !config.any_format() {
        return Err(ConfigError::Validation(
            "at least one of markdown, html or text output must be enabled".to_string(),
        ));
    }

    for (name, path) in [
        ("content_dir", &config.content_dir),
        ("urls_dir", &config.urls_dir),
        ("state_path", &config.state_path),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates a language code such as "en", "pt-BR" or "es-419"
pub(crate) fn validate_language_code(code: &str) -> Result<(), ConfigError> {
    if code.is_empty() {
        return Err(ConfigError::Validation(
            "language cannot be empty".to_string(),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        || code.starts_with('-')
        || code.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "language must contain only letters, digits and inner hyphens, got '{}'",
            code
        )));
    }

    Ok(())
}
