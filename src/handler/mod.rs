//! Request handler
//!
//! Invoked by API Gateway with `{spaceId, query, authorization}`. Resolves the
//! `Text` fields of the space's content types (cached per space and token),
//! fetches the requested entries and renders those fields from Markdown to
//! HTML.

pub mod cache;
pub mod content;
pub mod query;
pub mod transform;

use crate::config::HandlerConfig;
use crate::error::RemoteError;
use cache::TtlCache;
use content::ContentClient;
use query::Query;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use transform::{transform_entries, TextFields};

/// Event rendered by the integration's request template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "spaceId", default)]
    pub space_id: String,
    /// `{key=val, key2=val2}`
    #[serde(default)]
    pub query: String,
    /// Raw `Authorization` header; the template renders a missing header as `""`
    #[serde(default)]
    pub authorization: Option<String>,
}

/// Failure reported back through the gateway. The display text is the message.
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("missing space id")]
    MissingSpace,
    #[error("missing access token: send an Authorization header or an access_token parameter")]
    MissingToken,
    #[error("{0}")]
    Upstream(String),
    #[error(transparent)]
    Remote(RemoteError),
}

impl From<RemoteError> for HandlerError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Upstream(message) => HandlerError::Upstream(message),
            other => HandlerError::Remote(other),
        }
    }
}

/// Bearer token from the header, falling back to the `access_token` parameter
pub fn access_token(event: &InvocationEvent, query: &Query) -> Option<String> {
    let from_header = event
        .authorization
        .as_deref()
        .map(str::trim)
        .filter(|header| !header.is_empty())
        .map(|header| header.strip_prefix("Bearer ").unwrap_or(header).to_string());

    from_header.or_else(|| {
        query
            .get("access_token")
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

type TextFieldCache = TtlCache<(String, String), Arc<TextFields>>;

pub struct Handler {
    content: ContentClient,
    text_fields: TextFieldCache,
}

impl Handler {
    pub fn new(config: &HandlerConfig) -> anyhow::Result<Self> {
        Ok(Self::with_parts(
            ContentClient::new(&config.content_api_url)?,
            TtlCache::new(config.text_fields_ttl),
        ))
    }

    /// Build from an explicit client and cache (the cache may be shared)
    pub fn with_parts(content: ContentClient, text_fields: TextFieldCache) -> Self {
        Self {
            content,
            text_fields,
        }
    }

    async fn text_fields(
        &self,
        space_id: &str,
        access_token: &str,
    ) -> Result<Arc<TextFields>, HandlerError> {
        let key = (space_id.to_string(), access_token.to_string());
        let fields = self
            .text_fields
            .get_or_populate(key, || async {
                tracing::debug!("Text field cache miss for space {}", space_id);
                self.content
                    .text_fields(space_id, access_token)
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(fields)
    }

    /// Fetch the requested entries and render their `Text` fields
    pub async fn handle(&self, event: InvocationEvent) -> Result<Value, HandlerError> {
        if event.space_id.is_empty() {
            return Err(HandlerError::MissingSpace);
        }
        let query = Query::parse(&event.query);
        let access_token = access_token(&event, &query).ok_or(HandlerError::MissingToken)?;

        tracing::info!("Entries request for space {}", event.space_id);

        let text_fields = self.text_fields(&event.space_id, &access_token).await?;
        let entries = self
            .content
            .entries(&event.space_id, &access_token, query.pairs())
            .await?;

        Ok(transform_entries(entries, &text_fields))
    }
}
