use config::{Config, ConfigError};
use serde::Deserialize;

use crate::AppResult;

/// Static configuration, read once at startup.
pub mod static_config {
    use config::builder::DefaultState;
    use config::{Config, ConfigBuilder, Environment};

    /// Separator for nested keys, `SETTINGS__REGION` becomes `settings.region`
    pub const NESTING_SEPARATOR: &str = "__";

    /// Loads `env_file` into the process environment and returns a builder
    /// over the environment.
    ///
    /// A missing env file is not an error, the process environment alone is
    /// then used.
    pub fn create_config(env_file: &str) -> ConfigBuilder<DefaultState> {
        match dotenvy::from_filename(env_file) {
            Ok(path) => log::debug!("loaded env file {}", path.display()),
            Err(e) if e.not_found() => log::debug!("env file {} not found, using process environment", env_file),
            Err(e) => log::warn!("failed to load env file {}: {}", env_file, e),
        }
        Config::builder().add_source(Environment::default().separator(NESTING_SEPARATOR))
    }
}

/// Reads `key` from the config, falling back to `default` when the key is absent.
///
/// A key that is present but cannot be deserialized is still an error.
pub fn get_or_default<'de, T: Deserialize<'de>>(config: &Config, key: &str, default: T) -> AppResult<T> {
    match config.get::<T>(key) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_config_without_env_file() {
        let config = static_config::create_config("does/not/exist.env")
            .set_override("app_name", "processor-test")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.get_string("app_name").unwrap(), "processor-test");
    }

    #[test]
    fn test_get_or_default() {
        let config = Config::builder()
            .set_default("input_buffer", 42)
            .unwrap()
            .set_default("worker_timeout_millis", "not-a-number")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(get_or_default(&config, "input_buffer", 100usize).unwrap(), 42);
        assert_eq!(get_or_default(&config, "output_buffer", 100usize).unwrap(), 100);
        assert!(get_or_default(&config, "worker_timeout_millis", 5000u64).is_err());
    }
}
