//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CourtsyncConfig, DatabaseTarget};
use super::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix for environment overrides, e.g. `COURTSYNC_PROVIDER_SEASON`
pub const ENV_PREFIX: &str = "COURTSYNC";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`CourtsyncConfig`]
/// 4. Applies `COURTSYNC_*` environment overrides
/// 5. Validates the result
///
/// # Examples
///
/// ```no_run
/// use courtsync::config::loader::load_config;
///
/// let config = load_config("courtsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CourtsyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CourtsyncConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Every missing variable is reported at once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_override(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(section: &str, key: &str) -> Result<Option<T>> {
    match env_override(section, key) {
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            SyncError::Configuration(format!(
                "Invalid value '{raw}' for {ENV_PREFIX}_{section}_{key}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `COURTSYNC_<SECTION>_<KEY>` pattern
fn apply_env_overrides(config: &mut CourtsyncConfig) -> Result<()> {
    if let Some(val) = env_override("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parse_override("APPLICATION", "DRY_RUN")? {
        config.application.dry_run = val;
    }

    if let Some(val) = env_override("PROVIDER", "BASE_URL") {
        config.provider.base_url = val;
    }
    if let Some(val) = env_override("PROVIDER", "API_KEY") {
        config.provider.api_key = secret_string(val);
    }
    if let Some(val) = env_override("PROVIDER", "PASSWORD") {
        config.provider.password = secret_string(val);
    }
    if let Some(val) = env_override("PROVIDER", "SEASON") {
        config.provider.season = val;
    }
    if let Some(val) = parse_override("PROVIDER", "REQUEST_DELAY_MS")? {
        config.provider.request_delay_ms = val;
    }
    if let Some(val) = parse_override("PROVIDER", "TIMEOUT_SECONDS")? {
        config.provider.timeout_seconds = val;
    }
    if let Some(val) = parse_override("PROVIDER", "MAX_RETRY_ATTEMPTS")? {
        config.provider.retry.max_retry_attempts = val;
    }
    if let Some(val) = parse_override("PROVIDER", "RETRY_CLIENT_ERRORS")? {
        config.provider.retry.retry_client_errors = val;
    }

    if let Some(val) = env_override("DATABASE", "TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(SyncError::Configuration(format!(
                    "Invalid {ENV_PREFIX}_DATABASE_TARGET '{other}'. Must be postgresql or memory"
                )))
            }
        };
    }

    if let Some(ref mut pg) = config.postgresql {
        if let Some(val) = env_override("POSTGRESQL", "CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Some(val) = parse_override("POSTGRESQL", "MAX_CONNECTIONS")? {
            pg.max_connections = val;
        }
        if let Some(val) = env_override("POSTGRESQL", "SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    if let Some(val) = parse_override("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_override("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_substitute_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("COURTSYNC_LOADER_TEST_KEY", "abc123");
        let input = "api_key = \"${COURTSYNC_LOADER_TEST_KEY}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "api_key = \"abc123\"");
        std::env::remove_var("COURTSYNC_LOADER_TEST_KEY");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# api_key = \"${NOT_SET_ANYWHERE_COURTSYNC}\"\nseason = \"current\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_substitute_env_vars_reports_all_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("COURTSYNC_MISSING_A");
        std::env::remove_var("COURTSYNC_MISSING_B");
        let input = "a = \"${COURTSYNC_MISSING_A}\"\nb = \"${COURTSYNC_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("COURTSYNC_MISSING_A"));
        assert!(err.contains("COURTSYNC_MISSING_B"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-courtsync.toml");
        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
database_target = "memory"

[application]
log_level = "debug"

[provider]
base_url = "https://api.mysportsfeeds.com/v2.1/pull/nba"
api_key = "test-key"

[provider.retry]
max_retry_attempts = 5
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.provider.season, "current");
        assert_eq!(config.provider.retry.max_retry_attempts, 5);
        assert_eq!(config.database_target, DatabaseTarget::Memory);
    }

    #[test]
    fn test_invalid_numeric_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
database_target = "memory"

[provider]
base_url = "https://api.mysportsfeeds.com/v2.1/pull/nba"
api_key = "test-key"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        std::env::set_var("COURTSYNC_PROVIDER_TIMEOUT_SECONDS", "soon");
        let result = load_config(temp_file.path());
        std::env::remove_var("COURTSYNC_PROVIDER_TIMEOUT_SECONDS");

        let err = result.unwrap_err().to_string();
        assert!(err.contains("COURTSYNC_PROVIDER_TIMEOUT_SECONDS"));
    }
}
