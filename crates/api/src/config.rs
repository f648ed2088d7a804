//! Environment-driven configuration.
//!
//! Every tunable in the external-interfaces configuration table is read
//! here with a documented default, mirroring the runtime's own
//! `ExecutorConfig`/`PollerConfig::from_env` convention.

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,
    pub idempotency_require_key: bool,
    pub idempotency_retention_secs: u64,
    pub idempotency_lock_timeout_secs: u64,
    pub idempotency_max_response_bytes: usize,
    pub reprocessing_enabled: bool,
    pub reprocessing_interval_secs: u64,
    pub outbox_poll_interval_ms: u64,
    pub outbox_batch_size: u32,
    pub worker_pool_size: usize,
    pub circuit_breaker_failure_threshold: u32,
    pub circuit_breaker_reset_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable required"))?;

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            database_url,
            api_prefix: env_string_or("API_PREFIX", ""),
            cors_allowed_origins,
            idempotency_require_key: env_or("IDEMPOTENCY_REQUIRE_KEY", false),
            idempotency_retention_secs: env_or("IDEMPOTENCY_RETENTION_SECS", 86_400),
            idempotency_lock_timeout_secs: env_or("IDEMPOTENCY_LOCK_TIMEOUT_SECS", 300),
            idempotency_max_response_bytes: env_or("IDEMPOTENCY_MAX_RESPONSE_BYTES", 1_048_576),
            reprocessing_enabled: env_or("REPROCESSING_ENABLED", true),
            reprocessing_interval_secs: env_or("REPROCESSING_INTERVAL_SECS", 3_600),
            outbox_poll_interval_ms: env_or("OUTBOX_POLL_INTERVAL_MS", 1_000),
            outbox_batch_size: env_or("OUTBOX_BATCH_SIZE", 100),
            worker_pool_size: env_or("WORKER_POOL_SIZE", 10),
            circuit_breaker_failure_threshold: env_or("CIRCUIT_BREAKER_FAILURE_THRESHOLD", 5),
            circuit_breaker_reset_timeout_secs: env_or("CIRCUIT_BREAKER_RESET_TIMEOUT_SECS", 30),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_to_default() {
        std::env::remove_var("WMS_TEST_UNSET_VAR");
        assert_eq!(env_or::<u32>("WMS_TEST_UNSET_VAR", 42), 42);
    }
}
