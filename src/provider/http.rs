//! Shared HTTP helpers for model backends.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::MaestroError;

/// Build a client with an explicit request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, MaestroError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| MaestroError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
            headers.insert(AUTHORIZATION, val);
        }
    }
    headers
}

/// Map a transport failure to the backend error kinds.
pub fn request_error(backend: &str, error: reqwest::Error) -> MaestroError {
    if error.is_decode() {
        return MaestroError::Backend {
            status: error.status().map(|s| s.as_u16()).unwrap_or(200),
            message: format!("{backend} returned an unreadable response: {error}"),
        };
    }
    let reason = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    MaestroError::BackendUnavailable(format!("{backend}: {reason}: {error}"))
}

/// Map a non-success HTTP status to a backend error.
pub fn status_to_error(status: u16, body: &str) -> MaestroError {
    MaestroError::Backend {
        status,
        message: extract_error_message(body),
    }
}

fn extract_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        let error = v.get("error")?;
        error
            .as_str()
            .map(str::to_string)
            .or_else(|| error.get("message")?.as_str().map(str::to_string))
    });
    message.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "empty response body".to_string()
        } else {
            trimmed.to_string()
        }
    })
}
