use std::time::Duration;

use crate::error::AppError;

/// Default review API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Authorization scheme sent in front of the review API token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    OAuth,
    Bearer,
}

impl AuthScheme {
    /// Build the `Authorization` header value for `token`.
    pub fn header_value(&self, token: &str) -> String {
        match self {
            AuthScheme::OAuth => format!("OAuth {token}"),
            AuthScheme::Bearer => format!("Bearer {token}"),
        }
    }
}

/// Global application configuration loaded from environment variables.
///
/// Built once at startup and passed explicitly to every component.
#[derive(Clone)]
pub struct AppConfig {
    /// Review API token
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives notifications
    pub telegram_chat_id: String,

    /// Review API endpoint
    pub endpoint: String,

    /// Scheme used in the review API `Authorization` header (default: OAuth)
    pub auth_scheme: AuthScheme,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Seconds between poll cycles (default: 600)
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout in seconds (default: 30)
    pub http_timeout_secs: u64,

    /// Forward loop failures to the chat as well as the log (default: false)
    pub report_errors_to_chat: bool,
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let poll_interval_secs = parse_or(&lookup, "POLL_INTERVAL_SECS", 600)?;
        if poll_interval_secs == 0 {
            return Err(AppError::Config(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let http_timeout_secs = parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?;
        if http_timeout_secs == 0 {
            return Err(AppError::Config(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let auth_scheme = match lookup("API_AUTH_SCHEME").as_deref().map(str::trim) {
            None | Some("") | Some("OAuth") => AuthScheme::OAuth,
            Some("Bearer") => AuthScheme::Bearer,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "API_AUTH_SCHEME must be OAuth or Bearer, got {other:?}"
                )));
            }
        };

        Ok(Self {
            practicum_token: required(&lookup, "PRACTICUM_TOKEN")?,
            telegram_token: required(&lookup, "TELEGRAM_TOKEN")?,
            telegram_chat_id: required(&lookup, "TELEGRAM_CHAT_ID")?,
            endpoint: non_empty_or(&lookup, "ENDPOINT", DEFAULT_ENDPOINT)?,
            auth_scheme,
            telegram_api_url: non_empty_or(&lookup, "TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL)?
                .trim_end_matches('/')
                .to_string(),
            poll_interval_secs,
            http_timeout_secs,
            report_errors_to_chat: parse_bool_or(&lookup, "REPORT_ERRORS_TO_CHAT", false)?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("auth_scheme", &self.auth_scheme)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("report_errors_to_chat", &self.report_errors_to_chat)
            .finish()
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Err(AppError::Config(format!(
            "{key} environment variable is required"
        ))),
        Some(value) if value.trim().is_empty() => Err(AppError::Config(format!(
            "{key} environment variable is empty"
        ))),
        Some(value) => Ok(value.trim().to_string()),
    }
}

fn non_empty_or<F>(lookup: &F, key: &str, default: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(AppError::Config(format!(
            "{key} environment variable is empty"
        ))),
        Some(value) => Ok(value.trim().to_string()),
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a valid u64"))),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(_) => Err(AppError::Config(format!("{key} must be true or false"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("PRACTICUM_TOKEN", "practicum-secret"),
        ("TELEGRAM_TOKEN", "123:telegram-secret"),
        ("TELEGRAM_CHAT_ID", "42"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.telegram_api_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(config.auth_scheme, AuthScheme::OAuth);
        assert_eq!(config.poll_interval(), Duration::from_secs(600));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(!config.report_errors_to_chat);
        assert_eq!(config.telegram_chat_id, "42");
    }

    #[test]
    fn test_missing_required_variable() {
        for missing in ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"] {
            let pairs: Vec<_> = REQUIRED
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.is_fatal());
            assert!(err.to_string().contains(missing));
            assert!(err.to_string().contains("required"));
        }
    }

    #[test]
    fn test_empty_required_variable() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("TELEGRAM_TOKEN", "  ");
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_TOKEN environment variable is empty"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("ENDPOINT", "http://localhost:8080/statuses/"),
            ("API_AUTH_SCHEME", "Bearer"),
            ("TELEGRAM_API_URL", "http://localhost:9090/"),
            ("POLL_INTERVAL_SECS", "15"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("REPORT_ERRORS_TO_CHAT", "true"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/statuses/");
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.telegram_api_url, "http://localhost:9090");
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert!(config.report_errors_to_chat);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("POLL_INTERVAL_SECS", "ten"),
            ("POLL_INTERVAL_SECS", "0"),
            ("HTTP_TIMEOUT_SECS", "-1"),
            ("HTTP_TIMEOUT_SECS", "0"),
            ("API_AUTH_SCHEME", "Basic"),
            ("REPORT_ERRORS_TO_CHAT", "maybe"),
            ("ENDPOINT", ""),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, value));
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.is_fatal(), "{key}={value} should be rejected");
        }
    }

    #[test]
    fn test_zero_http_timeout_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("HTTP_TIMEOUT_SECS", "0"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: HTTP_TIMEOUT_SECS must be greater than zero"
        );
    }

    #[test]
    fn test_auth_header_value() {
        assert_eq!(AuthScheme::OAuth.header_value("abc"), "OAuth abc");
        assert_eq!(AuthScheme::Bearer.header_value("abc"), "Bearer abc");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("practicum-secret"));
        assert!(!printed.contains("telegram-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
