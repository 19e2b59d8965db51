//! Environment-variable helpers shared by the service and broker configs.

use std::str::FromStr;

/// A configuration variable was missing or could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Read `key`, falling back to `default` when unset.
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a required variable.
pub fn env_required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

/// Read and parse `key`, falling back to `default` when unset.
pub fn env_parse<T: FromStr>(
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw, expected),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated value, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_value<T: FromStr>(
    key: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(split_list(" users, banana ,,"), vec!["users", "banana"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn parse_value_accepts_numbers() {
        let port: u16 = parse_value("PORT", " 8080 ", "u16").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_value_reports_key_and_value() {
        let err = parse_value::<u16>("PORT", "eighty", "u16").unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid { key: "PORT", ref value, .. } if value == "eighty"
        );
        assert_eq!(err.to_string(), "PORT must be a valid u16, got 'eighty'");
    }
}
