use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::accounts::{self, TrackedAccount};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("failed to read accounts file {path}: {source}")]
    AccountsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse accounts file {path}: {source}")]
    AccountsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Output
    pub output_path: PathBuf,

    // Upstream
    pub syndication_base_url: String,
    pub permalink_base_url: String,
    pub fetch_timeout: Duration,
    pub fetch_delay: Duration,

    // Limits
    pub max_posts_per_account: usize,
    pub max_posts: usize,

    // Tracked accounts
    pub accounts: Vec<TrackedAccount>,

    // Exit policy
    pub fail_on_no_fetches: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value or the
    /// accounts file cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        let accounts = match optional_env("ACCOUNTS_FILE") {
            Some(path) => accounts::load_accounts_file(&PathBuf::from(path))?,
            None => accounts::default_accounts(),
        };

        Ok(Self {
            // Output
            output_path: PathBuf::from(env_or_default("OUTPUT_PATH", "./tweets.json")),

            // Upstream
            syndication_base_url: env_or_default(
                "SYNDICATION_BASE_URL",
                "https://syndication.twitter.com",
            ),
            permalink_base_url: env_or_default("PERMALINK_BASE_URL", "https://x.com"),
            fetch_timeout: Duration::from_secs(parse_env_u64("FETCH_TIMEOUT_SECS", 15)?),
            fetch_delay: Duration::from_secs(parse_env_u64("FETCH_DELAY_SECS", 3)?),

            // Limits
            max_posts_per_account: parse_env_usize("MAX_POSTS_PER_ACCOUNT", 8)?,
            max_posts: parse_env_usize("MAX_POSTS", 150)?,

            accounts,

            fail_on_no_fetches: parse_env_bool("FAIL_ON_NO_FETCHES", true)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("SYNDICATION_BASE_URL", &self.syndication_base_url),
            ("PERMALINK_BASE_URL", &self.permalink_base_url),
        ] {
            if value.is_empty() {
                return Err(invalid(name, "cannot be empty"));
            }
            if let Err(e) = url::Url::parse(value) {
                return Err(invalid(name, &format!("not a valid URL: {e}")));
            }
        }
        if self.fetch_timeout.is_zero() {
            return Err(invalid("FETCH_TIMEOUT_SECS", "must be at least 1"));
        }
        if self.max_posts_per_account == 0 {
            return Err(invalid("MAX_POSTS_PER_ACCOUNT", "must be at least 1"));
        }
        if self.max_posts == 0 {
            return Err(invalid("MAX_POSTS", "must be at least 1"));
        }
        accounts::validate_accounts(&self.accounts)
    }

    /// Configuration pointing at the given upstream and output path, with no
    /// delay between accounts. Intended for tests.
    #[must_use]
    pub fn for_testing(syndication_base_url: &str, output_path: PathBuf) -> Self {
        Self {
            output_path,
            syndication_base_url: syndication_base_url.to_string(),
            permalink_base_url: "https://x.com".to_string(),
            fetch_timeout: Duration::from_secs(5),
            fetch_delay: Duration::ZERO,
            max_posts_per_account: 8,
            max_posts: 150,
            accounts: accounts::default_accounts(),
            fail_on_no_fetches: true,
        }
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_parse_env_bool_spellings() {
        const VAR: &str = "TIMELINE_SNAPSHOT_TEST_FLAG";

        for (raw, expected) in [
            ("YES", true),
            ("1", true),
            ("On", true),
            ("no", false),
            ("0", false),
        ] {
            std::env::set_var(VAR, raw);
            assert_eq!(parse_env_bool(VAR, !expected).unwrap(), expected, "{raw}");
        }

        std::env::set_var(VAR, "");
        assert!(parse_env_bool(VAR, true).unwrap());

        std::env::set_var(VAR, "nah");
        let result = parse_env_bool(VAR, true);
        std::env::remove_var(VAR);
        assert!(matches!(
            result,
            Err(ConfigError::ParseBool { ref name, ref value }) if name == VAR && value == "nah"
        ));
    }

    #[test]
    fn test_for_testing_is_valid() {
        let config = Config::for_testing("http://127.0.0.1:1", PathBuf::from("out.json"));
        assert!(config.validate().is_ok());
        assert!(config.fetch_delay.is_zero());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = Config::for_testing("http://127.0.0.1:1", PathBuf::from("out.json"));

        let config = Config {
            syndication_base_url: "not a url".to_string(),
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_posts: 0,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = Config {
            fetch_timeout: Duration::ZERO,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = Config {
            accounts: Vec::new(),
            ..base
        };
        assert!(config.validate().is_err());
    }
}
