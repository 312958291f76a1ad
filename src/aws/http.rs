//! HTTP utilities for AWS REST API calls

use super::auth::SigV4Signer;
use crate::error::RemoteError;
use anyhow::Context;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

/// Error bodies longer than this are cut before they reach logs or messages
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Error body as it may appear in a log line: cut on a char boundary, control
/// characters removed
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for signed AWS API calls
#[derive(Clone)]
pub struct AwsHttpClient {
    client: Client,
}

impl AwsHttpClient {
    /// Create a new HTTP client
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cf-md-to-html/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a signed GET request
    pub async fn get(
        &self,
        signer: &SigV4Signer,
        url: &str,
        operation: &str,
    ) -> Result<Value, RemoteError> {
        self.send(signer, Method::GET, url, operation, None).await
    }

    /// Make a signed POST request with a JSON body
    pub async fn post(
        &self,
        signer: &SigV4Signer,
        url: &str,
        operation: &str,
        body: &Value,
    ) -> Result<Value, RemoteError> {
        self.send(signer, Method::POST, url, operation, Some(body)).await
    }

    /// Make a signed PUT request with a JSON body
    pub async fn put(
        &self,
        signer: &SigV4Signer,
        url: &str,
        operation: &str,
        body: &Value,
    ) -> Result<Value, RemoteError> {
        self.send(signer, Method::PUT, url, operation, Some(body)).await
    }

    /// Make a signed DELETE request
    pub async fn delete(
        &self,
        signer: &SigV4Signer,
        url: &str,
        operation: &str,
    ) -> Result<Value, RemoteError> {
        self.send(signer, Method::DELETE, url, operation, None).await
    }

    async fn send(
        &self,
        signer: &SigV4Signer,
        method: Method,
        url: &str,
        operation: &str,
        body: Option<&Value>,
    ) -> Result<Value, RemoteError> {
        tracing::debug!("{} {} ({})", method, url, operation);

        let parsed = Url::parse(url)
            .map_err(|e| RemoteError::invalid_response(operation, format!("bad URL {}: {}", url, e)))?;
        let payload = match body {
            Some(body) => serde_json::to_vec(body)
                .map_err(|e| RemoteError::invalid_response(operation, e.to_string()))?,
            None => Vec::new(),
        };

        let mut request = self
            .client
            .request(method.clone(), parsed.clone())
            .header(ACCEPT, "application/json");
        for (name, value) in signer.sign(method.as_str(), &parsed, &payload).await? {
            request = request.header(name, value);
        }
        if body.is_some() {
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let response_body = response.text().await?;

        if !status.is_success() {
            let error = classify_error(operation, status.as_u16(), &headers, &response_body);
            if error.is_not_found() {
                tracing::debug!("{} returned not found", operation);
            } else {
                tracing::error!(
                    "API error: {} {} - {}",
                    operation,
                    status,
                    sanitize_for_log(&response_body)
                );
            }
            return Err(error);
        }

        // Handle empty response
        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body)
            .map_err(|e| RemoteError::invalid_response(operation, format!("malformed JSON: {}", e)))
    }
}

/// Turn a non-2xx AWS response into a [`RemoteError`].
///
/// The error code comes from the `x-amzn-ErrorType` header when present
/// (`ResourceNotFoundException:http://...`), otherwise from the body's
/// `__type` / `Type` field. Lambda spells the message `Message`, API Gateway
/// spells it `message`.
pub fn classify_error(operation: &str, status: u16, headers: &HeaderMap, body: &str) -> RemoteError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let code = headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(':').next().unwrap_or(v).to_string())
        .or_else(|| {
            parsed
                .get("__type")
                .or_else(|| parsed.get("Type"))
                .and_then(Value::as_str)
                .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let message = parsed
        .get("message")
        .or_else(|| parsed.get("Message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| sanitize_for_log(body));

    if status == 404 || code.ends_with("NotFoundException") {
        return RemoteError::not_found(operation, message);
    }

    RemoteError::Api {
        operation: operation.to_string(),
        status,
        code,
        message,
    }
}
