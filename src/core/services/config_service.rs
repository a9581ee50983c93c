use crate::AppError;
use crate::core::cache::ResponseCache;
use crate::core::fetch::PageErrorPolicy;
use crate::core::source::DataSource;
use crate::error::ConfigError;
use crate::storage::config::Config;
use crate::utils::validation::validate_url;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "cache_dir",
    "default_identity",
    "default_source",
    "timeout_seconds",
    "on_page_error",
    "per_page",
];

/// GitHub caps `per_page` at this value.
const MAX_PER_PAGE: u32 = 100;

/// Validated access to the configuration file
pub struct ConfigService {
    config: Config,
}

fn invalid(field: &str, value: &str, reason: &str) -> AppError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set one key; an empty value clears it back to its default.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        let clear = value.is_empty();

        match key {
            "api_url" => {
                if !clear {
                    validate_url(value)?;
                }
                self.config.api_url = (!clear).then(|| value.trim_end_matches('/').to_string());
            }
            "cache_dir" => self.config.cache_dir = (!clear).then(|| PathBuf::from(value)),
            "default_identity" => {
                self.config.default_identity = (!clear).then(|| value.to_lowercase())
            }
            "default_source" => {
                self.config.default_source = if clear {
                    None
                } else {
                    let source: DataSource = value
                        .parse()
                        .map_err(|_| invalid(key, value, "expected a, c or p"))?;
                    Some(source.as_code().to_string())
                };
            }
            "timeout_seconds" => {
                self.config.timeout_seconds = if clear {
                    None
                } else {
                    match value.parse::<u64>() {
                        Ok(secs) if secs > 0 => Some(secs),
                        _ => return Err(invalid(key, value, "expected a positive number of seconds")),
                    }
                };
            }
            "on_page_error" => {
                self.config.on_page_error = if clear {
                    None
                } else {
                    let policy: PageErrorPolicy = value.parse()?;
                    Some(policy.to_string())
                };
            }
            "per_page" => {
                self.config.per_page = if clear {
                    None
                } else {
                    match value.parse::<u32>() {
                        Ok(n) if (1..=MAX_PER_PAGE).contains(&n) => Some(n),
                        _ => return Err(invalid(key, value, "expected a number from 1 to 100")),
                    }
                };
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Effective value of every key, defaults filled in.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let or_unset = |value: Option<String>| value.unwrap_or_else(|| "(not set)".to_string());
        let cache_dir = self
            .cache_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| "(unavailable)".to_string());

        vec![
            ("api_url", self.config.api_url().to_string()),
            ("cache_dir", cache_dir),
            ("default_identity", or_unset(self.config.default_identity.clone())),
            (
                "default_source",
                self.default_source().unwrap_or_default().to_string(),
            ),
            (
                "timeout_seconds",
                or_unset(self.config.timeout_seconds.map(|s| s.to_string())),
            ),
            (
                "on_page_error",
                self.page_error_policy().unwrap_or_default().to_string(),
            ),
            ("per_page", or_unset(self.config.per_page.map(|n| n.to_string()))),
        ]
    }

    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(|e| e.into())
    }

    pub fn default_source(&self) -> Result<DataSource, AppError> {
        match self.config.default_source.as_deref() {
            Some(code) => code
                .parse()
                .map_err(|_| invalid("default_source", code, "expected a, c or p")),
            None => Ok(DataSource::default()),
        }
    }

    pub fn page_error_policy(&self) -> Result<PageErrorPolicy, AppError> {
        match self.config.on_page_error.as_deref() {
            Some(policy) => Ok(policy.parse()?),
            None => Ok(PageErrorPolicy::default()),
        }
    }

    pub fn cache_dir(&self) -> Result<PathBuf, AppError> {
        match &self.config.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(ResponseCache::default_dir()?),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let service = ConfigService::new(Config::default());
        assert_eq!(service.default_source().unwrap(), DataSource::Prompt);
        assert_eq!(service.page_error_policy().unwrap(), PageErrorPolicy::Continue);
        assert!(service.timeout().is_none());
    }

    #[test]
    fn test_set_field_normalizes_values() {
        let mut service = ConfigService::new(Config::default());

        service.set_field("default_source", "API").unwrap();
        assert_eq!(service.config().default_source.as_deref(), Some("a"));
        assert_eq!(service.default_source().unwrap(), DataSource::Api);

        service.set_field("on_page_error", "Abort").unwrap();
        assert_eq!(service.page_error_policy().unwrap(), PageErrorPolicy::Abort);

        service.set_field("api_url", "https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(service.config().api_url(), "https://ghe.example.com/api/v3");

        service.set_field("timeout_seconds", "15").unwrap();
        assert_eq!(service.timeout(), Some(Duration::from_secs(15)));

        service.set_field("per_page", "100").unwrap();
        assert_eq!(service.config().per_page, Some(100));
    }

    #[test]
    fn test_set_field_rejects_bad_values() {
        let mut service = ConfigService::new(Config::default());

        assert!(service.set_field("api_url", "ghe.example.com").is_err());
        assert!(service.set_field("default_source", "z").is_err());
        assert!(service.set_field("timeout_seconds", "0").is_err());
        assert!(service.set_field("per_page", "101").is_err());
        assert!(matches!(
            service.set_field("on_page_error", "retry"),
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            service.set_field("colour", "blue"),
            Err(AppError::Config(ConfigError::UnknownKey { .. }))
        ));
    }

    #[test]
    fn test_empty_value_clears() {
        let mut service = ConfigService::new(Config::default());
        service.set_field("per_page", "50").unwrap();
        service.set_field("per_page", "").unwrap();
        assert!(service.config().per_page.is_none());
    }

    #[test]
    fn test_invalid_value_message_names_the_range() {
        let mut service = ConfigService::new(Config::default());
        let err = service.set_field("per_page", "500").unwrap_err();
        assert_eq!(
            err.to_string(),
            "ConfigError: Invalid configuration value for 'per_page': 500 \
             (expected a number from 1 to 100)"
        );
    }

    #[test]
    fn test_entries_cover_every_key() {
        let service = ConfigService::new(Config::default());
        let keys: Vec<&str> = service.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, CONFIG_KEYS);
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = Config::file_in(temp_dir.path());
        let mut service = ConfigService::new(Config::default());
        service.set_field("default_identity", "OctoCat").unwrap();
        service.save_config(Some(path.clone())).unwrap();

        let loaded = Config::load(Some(path)).unwrap();
        assert_eq!(loaded.default_identity.as_deref(), Some("octocat"));
    }
}
