use std::path::PathBuf;
use std::time::Duration;

const TOKEN_VAR: &str = "TELOXIDE_TOKEN";
const DATA_DIR_VAR: &str = "QUIZ_DATA_DIR";
const ANSWER_DELAY_VAR: &str = "QUIZ_ANSWER_DELAY_MS";

const DEFAULT_ANSWER_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TELOXIDE_TOKEN is not set")]
    MissingToken,
    #[error("QUIZ_ANSWER_DELAY_MS must be a number of milliseconds, got '{0}'")]
    InvalidAnswerDelay(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    /// Directory holding the question set files.
    pub data_dir: PathBuf,
    /// Pause between showing the answer verdict and the next question.
    pub answer_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let data_dir = lookup(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let answer_delay = match lookup(ANSWER_DELAY_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidAnswerDelay(raw))?,
            None => DEFAULT_ANSWER_DELAY,
        };

        Ok(Self {
            token,
            data_dir,
            answer_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingToken)));
        assert!(matches!(
            config(&[(TOKEN_VAR, "  ")]),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn defaults() {
        let config = config(&[(TOKEN_VAR, "123:abc")]).unwrap();
        assert_eq!(config.token, "123:abc");
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.answer_delay, Duration::from_millis(1500));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            (TOKEN_VAR, "123:abc"),
            (DATA_DIR_VAR, "/srv/quiz"),
            (ANSWER_DELAY_VAR, "0"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/quiz"));
        assert!(config.answer_delay.is_zero());

        assert!(matches!(
            config_with_delay("soon"),
            Err(ConfigError::InvalidAnswerDelay(raw)) if raw == "soon"
        ));
    }

    fn config_with_delay(delay: &str) -> Result<Config, ConfigError> {
        config(&[(TOKEN_VAR, "123:abc"), (ANSWER_DELAY_VAR, delay)])
    }
}
