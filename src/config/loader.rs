//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.api.origin, "https://api.themoviedb.org");
        assert_eq!(config.api.accept.as_deref(), Some("application/json"));
        assert_eq!(config.plugin.origin, "https://emby.media/emby/PluginCatalog");
        assert_eq!(config.plugin.accept, None);
        assert_eq!(config.api.cache_max_age_secs, 600);
        assert_eq!(config.plugin.cache_max_age_secs, 600);
    }

    #[test]
    fn test_partial_sections_keep_their_own_defaults() {
        let config = parse_config(
            r#"
            [plugin]
            origin = "http://127.0.0.1:9000/catalog"

            [api]
            cache_max_age_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.plugin.origin, "http://127.0.0.1:9000/catalog");
        assert_eq!(
            config.plugin.user_agent,
            "Mozilla/5.0 (compatible; Cf-emby-Proxy/1.0)"
        );
        assert_eq!(config.plugin.cache_max_age_secs, 600);
        assert_eq!(config.api.cache_max_age_secs, 60);
        assert_eq!(config.api.origin, "https://api.themoviedb.org");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[timeouts]\nconnect_secs = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = parse_config(
            r#"
            [timeouts]
            connect_secs = 0

            [api]
            origin = "not a url"
            "#,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("timeouts.connect_secs"));
        assert!(message.contains("api.origin"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
