//! Shared HTTP transport for provider adapters.
//!
//! One POST per call. Non-2xx statuses are classified into `ProviderError`
//! and returned; nothing is retried here or anywhere above.

use crate::models::ProviderError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Error body shape shared by all three providers (`{"error": {"message": ..}}`).
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Thin wrapper around a `reqwest::Client` with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(timeout_secs);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { client, timeout })
    }

    /// POST `body` as JSON and decode a JSON response.
    pub async fn post_json<B, R>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &B,
        model: &str,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(url = url, model = model, "Sending completion request");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &error_body, model, retry_after));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

/// Map a failed HTTP status and body onto a `ProviderError`.
pub(crate) fn classify_error(
    status: u16,
    body: &str,
    model: &str,
    retry_after_secs: Option<f64>,
) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 => ProviderError::AuthenticationFailed,
        404 => ProviderError::ModelNotFound(model.to_string()),
        429 => ProviderError::RateLimited {
            message,
            retry_after_secs,
        },
        _ => ProviderError::Api { status, message },
    }
}

/// JSON headers with `Authorization: Bearer <key>`.
pub(crate) fn bearer_headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ProviderError::InvalidHeader("authorization"))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// JSON headers carrying the key in a custom header (e.g. `x-api-key`).
#[cfg_attr(not(feature = "anthropic"), allow(dead_code))]
pub(crate) fn api_key_headers(
    header: &'static str,
    api_key: &str,
    extra: &[(&'static str, &'static str)],
) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(header),
        HeaderValue::from_str(api_key).map_err(|_| ProviderError::InvalidHeader(header))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    Ok(headers)
}
