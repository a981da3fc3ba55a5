//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any TTL is 0
    /// - `lock_poll_ms` is below 10ms (would busy-poll the store)
    /// - `timeout_ms` is outside 100ms..5min
    /// - `max_concurrent_questions` is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.lock_ttl_secs == 0 || self.revision_lock_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "lock_ttl_secs".into(), reason: "must be greater than 0".into() });
        }

        if self.lock_poll_ms < 10 {
            return Err(ConfigError::Invalid { field: "lock_poll_ms".into(), reason: "must be at least 10ms".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_concurrent_questions == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_questions".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.lock_wait_secs > self.cache_ttl_secs {
            tracing::warn!(
                lock_wait_secs = self.lock_wait_secs,
                cache_ttl_secs = self.cache_ttl_secs,
                "lock_wait_secs exceeds cache_ttl_secs; waiters may outlive the entry they wait for"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_cache_ttl() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_zero_lock_ttl() {
        let config = AppConfig { lock_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "lock_ttl_secs"));
    }

    #[test]
    fn test_validate_busy_poll_interval() {
        let config = AppConfig { lock_poll_ms: 1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "lock_poll_ms"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let config = AppConfig { max_concurrent_questions: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_concurrent_questions"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { lock_poll_ms: 10, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
