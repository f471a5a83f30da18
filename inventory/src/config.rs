//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs.

use api_inventory_common::config::ClientConfig;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Get an environment variable without a deprecated name, parsing to a specific type
///
/// Returns `default` if the variable is not set or parsing fails.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// 環境変数からクライアント設定を読み込む
///
/// - `INVENTORY_BASE_URL`（旧: `AKTO_URL`）
/// - `INVENTORY_TIMEOUT_SECS`（旧: `AKTO_TIMEOUT_SECS`）
/// - `INVENTORY_EVENT_CAPACITY`
pub fn client_config_from_env() -> ClientConfig {
    let defaults = ClientConfig::default();
    ClientConfig {
        base_url: get_env_with_fallback_or("INVENTORY_BASE_URL", "AKTO_URL", &defaults.base_url),
        request_timeout_secs: get_env_with_fallback_parse(
            "INVENTORY_TIMEOUT_SECS",
            "AKTO_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        ),
        event_channel_capacity: get_env_parse(
            "INVENTORY_EVENT_CAPACITY",
            defaults.event_channel_capacity,
        ),
    }
}
