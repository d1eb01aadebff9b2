use dotenv::dotenv;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub ride_service_base_url: String,
    pub user_id: Option<i64>,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Self {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ride_service_base_url = lookup("RIDE_SERVICE_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let user_id = lookup("RIDE_USER_ID").and_then(|v| v.trim().parse().ok());

        let request_timeout_ms = lookup("RIDE_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(10_000);

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Self {
            ride_service_base_url,
            user_id,
            request_timeout_ms,
            log_level,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = AppConfig::from_lookup(|_| None);

        assert_eq!(config.ride_service_base_url, "http://localhost:3000/api");
        assert_eq!(config.user_id, None);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RIDE_SERVICE_BASE_URL", "https://rides.example.com/api/"),
            ("RIDE_USER_ID", "17"),
            ("RIDE_REQUEST_TIMEOUT_MS", "2500"),
            ("LOG_LEVEL", "debug"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.ride_service_base_url, "https://rides.example.com/api");
        assert_eq!(config.user_id, Some(17));
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = AppConfig::from_lookup(|key| match key {
            "RIDE_USER_ID" => Some("someone".into()),
            "RIDE_REQUEST_TIMEOUT_MS" => Some("0".into()),
            _ => None,
        });

        assert_eq!(config.user_id, None);
        assert_eq!(config.request_timeout_ms, 10_000);
    }
}
