use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use homework_common::config::{AppConfig, AuthScheme};
use homework_common::error::AppError;
use homework_common::types::{FetchOutcome, HomeworkStatusesResponse, StatusUpdate};

/// Source of homework review statuses.
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    /// Fetch the newest status change since `since` (unix seconds).
    async fn fetch_status(&self, since: i64) -> Result<FetchOutcome, AppError>;
}

/// HTTP client for the homework review API.
pub struct StatusPoller {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    auth_scheme: AuthScheme,
}

impl StatusPoller {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        auth_scheme: AuthScheme,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            auth_scheme,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.endpoint.clone(),
            config.practicum_token.clone(),
            config.auth_scheme,
            config.http_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl StatusSource for StatusPoller {
    async fn fetch_status(&self, since: i64) -> Result<FetchOutcome, AppError> {
        tracing::debug!(endpoint = %self.endpoint, from_date = since, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, self.auth_scheme.header_value(&self.token))
            .query(&[("from_date", since)])
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            // Error bodies usually carry `code`/`message`; keep them if readable.
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<Value>(&body).ok())
                .and_then(|value| api_rejection(&value))
                .map(|(code, message)| format!("{code}: {message}"));

            return Err(AppError::Endpoint {
                status: status.as_u16(),
                url: self.endpoint.clone(),
                detail,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let outcome = parse_statuses(&body)?;
        if let FetchOutcome::Update { update, .. } = &outcome {
            tracing::debug!(
                homework = %update.homework_name,
                status = %update.status,
                "Received homework status"
            );
        }

        Ok(outcome)
    }
}

/// Interpret a `homework_statuses` response body.
///
/// Only the first (newest) homework record matters. A body carrying a `code`
/// key is the API reporting a problem with the request itself.
pub fn parse_statuses(body: &str) -> Result<FetchOutcome, AppError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| AppError::Parse(format!("invalid JSON: {e}")))?;

    if let Some((code, message)) = api_rejection(&value) {
        return Err(AppError::ApiRejected { code, message });
    }

    let response: HomeworkStatusesResponse = serde_json::from_value(value)
        .map_err(|e| AppError::Parse(format!("unexpected response shape: {e}")))?;

    match response.homeworks.first() {
        Some(homework) => Ok(FetchOutcome::Update {
            update: StatusUpdate::try_from(homework)?,
            current_date: response.current_date,
        }),
        None => Ok(FetchOutcome::NoChange {
            current_date: response.current_date,
        }),
    }
}

/// Extract `(code, message)` from an API error body.
fn api_rejection(value: &Value) -> Option<(String, String)> {
    let code = value.get("code")?;
    let code = code
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string());
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string();
    Some((code, message))
}
