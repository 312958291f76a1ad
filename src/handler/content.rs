//! Content Delivery API client

use super::transform::{text_fields_from_content_types, TextFields};
use crate::error::RemoteError;
use anyhow::Context;
use reqwest::Client;
use serde_json::Value;

/// Authenticated access to `/spaces/{spaceId}/...`
#[derive(Clone)]
pub struct ContentClient {
    client: Client,
    base_url: String,
}

impl ContentClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cf-md-to-html/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a space sub-resource.
    ///
    /// The Delivery API reports failures as `{"sys": {"type": "Error"}, "message": ...}`;
    /// those become [`RemoteError::Upstream`] carrying the message.
    pub async fn get(
        &self,
        space_id: &str,
        access_token: &str,
        resource_path: &str,
        params: &[(String, String)],
    ) -> Result<Value, RemoteError> {
        let url = format!(
            "{}/spaces/{}/{}",
            self.base_url,
            urlencoding::encode(space_id),
            resource_path
        );
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(&url).bearer_auth(access_token);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let data: Value = serde_json::from_str(&body).map_err(|e| {
            RemoteError::invalid_response(resource_path, format!("status {}: {}", status, e))
        })?;

        if data["sys"]["type"] == "Error" {
            let message = data["message"]
                .as_str()
                .unwrap_or("The content API returned an error")
                .to_string();
            tracing::warn!("Content API error on {}: {}", resource_path, message);
            return Err(RemoteError::Upstream(message));
        }

        if !status.is_success() {
            return Err(RemoteError::Api {
                operation: resource_path.to_string(),
                status: status.as_u16(),
                code: "Unknown".to_string(),
                message: "unexpected response from the content API".to_string(),
            });
        }

        Ok(data)
    }

    /// Content type id → `Text` field ids for the space
    pub async fn text_fields(
        &self,
        space_id: &str,
        access_token: &str,
    ) -> Result<TextFields, RemoteError> {
        let content_types = self.get(space_id, access_token, "content_types", &[]).await?;
        Ok(text_fields_from_content_types(&content_types))
    }

    pub async fn entries(
        &self,
        space_id: &str,
        access_token: &str,
        params: &[(String, String)],
    ) -> Result<Value, RemoteError> {
        self.get(space_id, access_token, "entries", params).await
    }
}
