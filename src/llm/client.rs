//! LLM HTTP Client
//!
//! A thin HTTP client for LLM APIs. Each call is made exactly once; failures
//! are classified into authentication and upstream errors and returned.

use crate::error::{Result, SqlChatError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// HTTP client for LLM API requests
#[derive(Clone)]
pub struct LLMHttpClient {
    /// Reqwest HTTP client
    client: Client,
    /// Provider name used in error messages
    provider: String,
}

impl LLMHttpClient {
    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(provider: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            provider: provider.into(),
        })
    }

    /// POST a JSON body and return the response text
    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &T,
    ) -> Result<String> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_body(response).await
    }

    /// GET a URL and return the response text
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<String> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_body(response).await
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        tracing::debug!(provider = %self.provider, status = status.as_u16(), "LLM API response");

        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(classify_status(&self.provider, status, &text))
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> SqlChatError {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("could not reach the API: {}", err)
        } else {
            err.to_string()
        };
        SqlChatError::upstream(self.provider.clone(), message)
    }

    /// Build standard headers for API requests
    ///
    /// Fails with an authentication error if the key cannot be sent as a header.
    pub fn build_headers(provider: &str, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            SqlChatError::Authentication {
                provider: provider.to_string(),
                message: "API key contains characters that cannot be sent in a header"
                    .to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }
}

/// Map a non-success status to the error taxonomy
pub fn classify_status(provider: &str, status: StatusCode, body: &str) -> SqlChatError {
    let message = api_error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SqlChatError::Authentication {
            provider: provider.to_string(),
            message,
        },
        _ => SqlChatError::Upstream {
            provider: provider.to_string(),
            status: Some(status.as_u16()),
            message,
        },
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else use the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                "empty response body".to_string()
            } else {
                body.to_string()
            }
        })
}
