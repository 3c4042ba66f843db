use super::*;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &GatewayConfig) -> ConfigResult<()> {
        Self::validate_server_settings(config)?;
        Self::validate_completion(&config.completion)?;
        Self::validate_retry(&config.retry)?;
        Ok(())
    }

    fn validate_server_settings(config: &GatewayConfig) -> ConfigResult<()> {
        if config.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: config.port.to_string(),
                reason: "Port must be > 0".to_string(),
            });
        }

        if config.max_payload_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_payload_size".to_string(),
                value: config.max_payload_size.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        if config.request_id_headers.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "request_id_headers".to_string(),
                value: format!("{:?}", config.request_id_headers),
                reason: "Header names cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_completion(completion: &CompletionConfig) -> ConfigResult<()> {
        if completion.api_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "api_key (GROQ_API_KEY)".to_string(),
            });
        }

        Self::validate_url(&completion.base_url)?;

        if completion.model.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "model".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "temperature".to_string(),
                value: completion.temperature.to_string(),
                reason: "Must be between 0.0 and 2.0".to_string(),
            });
        }

        if completion.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: completion.request_timeout_secs.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_retry(retry: &RetryConfig) -> ConfigResult<()> {
        if !(1..=10).contains(&retry.max_attempts) {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".to_string(),
                value: retry.max_attempts.to_string(),
                reason: "Must be between 1 and 10 (set to 1 to disable retries)".to_string(),
            });
        }
        if retry.initial_backoff_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.initial_backoff_ms".to_string(),
                value: retry.initial_backoff_ms.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }
        if retry.max_backoff_ms < retry.initial_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_backoff_ms".to_string(),
                value: retry.max_backoff_ms.to_string(),
                reason: "Must be >= initial_backoff_ms".to_string(),
            });
        }
        if retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.backoff_multiplier".to_string(),
                value: retry.backoff_multiplier.to_string(),
                reason: "Must be >= 1.0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&retry.jitter_factor) {
            return Err(ConfigError::InvalidValue {
                field: "retry.jitter_factor".to_string(),
                value: retry.jitter_factor.to_string(),
                reason: "Must be between 0.0 and 1.0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_url(url: &str) -> ConfigResult<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: url.to_string(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        match reqwest::Url::parse(url) {
            Ok(parsed) if parsed.host_str().is_some() => Ok(()),
            Ok(_) => Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: url.to_string(),
                reason: "URL must have a valid host".to_string(),
            }),
            Err(e) => Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: url.to_string(),
                reason: format!("Invalid URL format: {}", e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            completion: CompletionConfig::new("gsk_test"),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_validate_defaults_with_api_key() {
        assert!(ConfigValidator::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_missing_api_key() {
        let config = GatewayConfig::default();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = valid_config();
        config.completion.base_url = "api.groq.com/openai/v1".to_string();
        assert!(matches!(
            ConfigValidator::validate(&config),
            Err(ConfigError::InvalidValue { field, .. }) if field == "base_url"
        ));

        config.completion.base_url = "http://".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut config = valid_config();
        config.completion.temperature = 2.5;
        assert!(ConfigValidator::validate(&config).is_err());

        config.completion.temperature = 0.0;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = valid_config();
        config.completion.request_timeout_secs = 0;
        assert!(matches!(
            ConfigValidator::validate(&config),
            Err(ConfigError::InvalidValue { field, .. }) if field == "request_timeout_secs"
        ));
    }

    #[test]
    fn test_validate_retry_bounds() {
        let mut config = valid_config();
        config.retry.max_attempts = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        config.retry.max_attempts = 1;
        assert!(ConfigValidator::validate(&config).is_ok());

        config.retry.max_backoff_ms = config.retry.initial_backoff_ms - 1;
        assert!(matches!(
            ConfigValidator::validate(&config),
            Err(ConfigError::InvalidValue { field, .. }) if field == "retry.max_backoff_ms"
        ));
    }

    #[test]
    fn test_validate_server_settings() {
        let mut config = valid_config();
        config.port = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = valid_config();
        config.max_payload_size = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = valid_config();
        config.request_id_headers = vec!["".to_string()];
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
