//! Typed access to environment overrides

use std::time::Duration;
use thiserror::Error;

/// Environment variable could not be interpreted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidSeconds { name: String, value: String },
}

/// Read a variable, treating unset and blank values alike
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a duration expressed in whole seconds
pub fn env_duration_secs(name: &str) -> Result<Option<Duration>, EnvError> {
    env_string(name)
        .map(|value| parse_seconds(name, &value))
        .transpose()
}

fn parse_seconds(name: &str, value: &str) -> Result<Duration, EnvError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| EnvError::InvalidSeconds {
            name: name.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("X", "10"), Ok(Duration::from_secs(10)));
        assert_eq!(
            parse_seconds("X", "ten"),
            Err(EnvError::InvalidSeconds {
                name: "X".to_string(),
                value: "ten".to_string(),
            })
        );
    }

    #[test]
    fn test_unset_variable_is_none() {
        assert_eq!(env_string("DASHBOARD_UTILS_TEST_SURELY_UNSET"), None);
        assert_eq!(
            env_duration_secs("DASHBOARD_UTILS_TEST_SURELY_UNSET"),
            Ok(None)
        );
    }
}
