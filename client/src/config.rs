use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::application::player::ControllerConfig;
use crate::domain::aggregates::AttemptPolicy;
use crate::domain::value_objects::DEFAULT_MAX_TIME_SECONDS;

const DEFAULT_CONFIG_FILE: &str = "raffify";
const ENV_PREFIX: &str = "RAFFIFY";

/// Client settings.
///
/// Layered as: built-in defaults, then an optional `raffify.{toml,yaml,json}`
/// in the working directory, then `RAFFIFY__SECTION__KEY` environment
/// variables (e.g. `RAFFIFY__BACKEND__BASE_URL`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Contest to play when none is given on the command line
    #[serde(default)]
    pub contest_id: Option<String>,
    pub backend: BackendSettings,
    pub game: GameSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    pub max_time_seconds: u32,
    pub tick_millis: u64,
    pub consume_attempt_on_verification_error: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(
            DEFAULT_CONFIG_FILE,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn build(file: &str, environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("backend.base_url", "http://localhost:8080/api")?
            .set_default("backend.request_timeout_secs", 10)?
            .set_default("game.max_time_seconds", i64::from(DEFAULT_MAX_TIME_SECONDS))?
            .set_default("game.tick_millis", 1000)?
            .set_default("game.consume_attempt_on_verification_error", true)?
            .add_source(File::with_name(file).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.game.tick_millis.max(1))
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            tick_period: self.tick_period(),
            policy: AttemptPolicy {
                consume_on_verification_error: self.game.consume_attempt_on_verification_error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::build("does-not-exist", env(&[])).unwrap();

        assert_eq!(settings.backend.base_url, "http://localhost:8080/api");
        assert_eq!(settings.backend.request_timeout_secs, 10);
        assert!(settings.backend.api_token.is_none());
        assert_eq!(settings.game.max_time_seconds, 3600);
        assert_eq!(settings.tick_period(), Duration::from_secs(1));
        assert!(settings.game.consume_attempt_on_verification_error);
        assert!(settings.contest_id.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::build(
            "does-not-exist",
            env(&[
                ("RAFFIFY__BACKEND__BASE_URL", "https://raffify.example/api"),
                ("RAFFIFY__BACKEND__API_TOKEN", "abc"),
                ("RAFFIFY__GAME__MAX_TIME_SECONDS", "120"),
                ("RAFFIFY__GAME__CONSUME_ATTEMPT_ON_VERIFICATION_ERROR", "false"),
                ("RAFFIFY__CONTEST_ID", "spring"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.backend.base_url, "https://raffify.example/api");
        assert_eq!(settings.backend.api_token.as_deref(), Some("abc"));
        assert_eq!(settings.game.max_time_seconds, 120);
        assert_eq!(settings.contest_id.as_deref(), Some("spring"));

        let controller = settings.controller_config();
        assert!(!controller.policy.consume_on_verification_error);
    }
}
