//! API Configuration Module
//!
//! Runtime settings loaded from `ITAGENT_*` environment variables with
//! defaults suitable for local development.

use crate::services::permission::{parse_rules, PermissionEffect, PermissionRule};

/// Default number of entries returned by `GET /tool-logs?recent`.
pub const DEFAULT_RECENT_LOGS: usize = 10;
/// Default tool-log retention in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;
/// Default page size for `GET /tools`.
pub const DEFAULT_TOOL_LIST_LIMIT: usize = 50;
/// Default page size for interaction listings.
pub const DEFAULT_INTERACTION_PAGE_SIZE: usize = 20;
/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default cap on requests handled at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 1024;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration: CORS, request defaults and tool permissions.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins. Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Request Defaults
    // ========================================================================
    /// Owner id used for session calls without an authenticated caller.
    pub default_user_id: String,

    pub recent_logs_default: usize,
    pub log_retention_days: i64,
    pub tool_list_limit: usize,
    pub interaction_page_size: usize,

    // ========================================================================
    // Request Limits
    // ========================================================================
    /// Requests still running after this many milliseconds get 408.
    pub request_timeout_ms: u64,

    /// Requests beyond this many wait for a free slot.
    pub max_concurrent_requests: usize,

    // ========================================================================
    // Tool Permissions
    // ========================================================================
    /// Ordered rules; the first match decides.
    pub tool_permission_rules: Vec<PermissionRule>,

    /// Effect when no rule matches.
    pub tool_permission_fallback: PermissionEffect,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,

            default_user_id: "anonymous".to_string(),
            recent_logs_default: DEFAULT_RECENT_LOGS,
            log_retention_days: DEFAULT_RETENTION_DAYS,
            tool_list_limit: DEFAULT_TOOL_LIST_LIMIT,
            interaction_page_size: DEFAULT_INTERACTION_PAGE_SIZE,

            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,

            tool_permission_rules: Vec::new(),
            tool_permission_fallback: PermissionEffect::Allow,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ITAGENT_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `ITAGENT_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `ITAGENT_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `ITAGENT_DEFAULT_USER_ID`: Fallback session owner (default: anonymous)
    /// - `ITAGENT_RECENT_LOGS_DEFAULT`: default `recent` count (default: 10)
    /// - `ITAGENT_LOG_RETENTION_DAYS`: tool-log retention (default: 30)
    /// - `ITAGENT_TOOL_LIST_LIMIT`: default `GET /tools` limit (default: 50)
    /// - `ITAGENT_INTERACTION_PAGE_SIZE`: default interaction page (default: 20)
    /// - `ITAGENT_REQUEST_TIMEOUT_MS`: per-request timeout (default: 30000)
    /// - `ITAGENT_MAX_CONCURRENT_REQUESTS`: in-flight request cap (default: 1024)
    /// - `ITAGENT_TOOL_PERMISSION_RULES`: `agent:tool:effect` entries separated by `;`
    /// - `ITAGENT_TOOL_PERMISSION_FALLBACK`: "allow" or "deny" (default: allow)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("ITAGENT_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("ITAGENT_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let default_user_id = std::env::var("ITAGENT_DEFAULT_USER_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_user_id);

        let tool_permission_rules = std::env::var("ITAGENT_TOOL_PERMISSION_RULES")
            .ok()
            .map(|raw| parse_rules(&raw))
            .unwrap_or_default();

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs: env_parse("ITAGENT_CORS_MAX_AGE_SECS", defaults.cors_max_age_secs),
            default_user_id,
            recent_logs_default: env_parse(
                "ITAGENT_RECENT_LOGS_DEFAULT",
                defaults.recent_logs_default,
            ),
            log_retention_days: env_parse(
                "ITAGENT_LOG_RETENTION_DAYS",
                defaults.log_retention_days,
            ),
            tool_list_limit: env_parse("ITAGENT_TOOL_LIST_LIMIT", defaults.tool_list_limit),
            interaction_page_size: env_parse(
                "ITAGENT_INTERACTION_PAGE_SIZE",
                defaults.interaction_page_size,
            ),
            request_timeout_ms: env_parse("ITAGENT_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)
                .max(1),
            max_concurrent_requests: env_parse(
                "ITAGENT_MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )
            .max(1),
            tool_permission_rules,
            tool_permission_fallback: env_parse(
                "ITAGENT_TOOL_PERMISSION_FALLBACK",
                defaults.tool_permission_fallback,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.default_user_id, "anonymous");
        assert_eq!(config.recent_logs_default, 10);
        assert_eq!(config.log_retention_days, 30);
        assert_eq!(config.tool_list_limit, 50);
        assert_eq!(config.interaction_page_size, 20);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.max_concurrent_requests, 1024);
        assert_eq!(config.tool_permission_fallback, PermissionEffect::Allow);
    }
}
