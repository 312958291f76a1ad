//! AWS Authentication
//!
//! Credentials come from the standard AWS provider chain (environment,
//! shared config and credentials files, SSO, assume-role, container and
//! instance metadata). Requests are signed with Signature Version 4.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use url::Url;

/// Refresh temporary credentials this long before they expire so a request
/// never goes out with keys that lapse in flight
const CREDENTIALS_EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("failed to resolve AWS credentials: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("failed to sign request: {0}")]
    Signing(String),
}

/// AWS credentials provider with caching of the resolved keys
#[derive(Clone, Debug)]
pub struct AwsCredentials {
    provider: SharedCredentialsProvider,
    cache: Arc<RwLock<Option<Credentials>>>,
}

fn is_fresh(credentials: &Credentials, now: SystemTime) -> bool {
    match credentials.expiry() {
        Some(expiry) => now + CREDENTIALS_EXPIRY_BUFFER < expiry,
        None => true,
    }
}

impl AwsCredentials {
    /// Use the default provider chain for `region`.
    ///
    /// Nothing is resolved yet; the first signed request does that.
    pub async fn load(region: &str) -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let provider = config
            .credentials_provider()
            .context("No AWS credentials provider is configured")?;

        Ok(Self::from_provider(provider))
    }

    pub fn from_provider(provider: impl ProvideCredentials + 'static) -> Self {
        Self {
            provider: SharedCredentialsProvider::new(provider),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Fixed keys (endpoint overrides, tests)
    pub fn from_keys(access_key_id: &str, secret_access_key: &str, session_token: Option<&str>) -> Self {
        Self::from_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            session_token.map(str::to_string),
            None,
            "static",
        ))
    }

    /// Current credentials, resolved again once the cached ones near expiry
    pub async fn get(&self) -> Result<Credentials, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if is_fresh(cached, SystemTime::now()) {
                    return Ok(cached.clone());
                }
                tracing::debug!("Cached AWS credentials expire soon, resolving again");
            }
        }

        let credentials = self.provider.provide_credentials().await?;
        tracing::debug!(
            "Resolved AWS credentials {} (expires {:?})",
            credentials.access_key_id(),
            credentials.expiry()
        );

        *self.cache.write().await = Some(credentials.clone());
        Ok(credentials)
    }
}

/// Request signer bound to one region and service
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: AwsCredentials, region: &str, service: &str) -> Self {
        Self {
            credentials,
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Headers to add to the request, signed with the current credentials
    pub async fn sign(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
    ) -> Result<Vec<(String, String)>, AuthError> {
        let credentials = self.credentials.get().await?;
        sign_request(
            &credentials,
            &self.region,
            &self.service,
            method,
            url,
            body,
            SystemTime::now(),
        )
    }
}

/// Sign one request and return the headers to add (`x-amz-date`,
/// `authorization`, and `x-amz-security-token` for temporary keys).
///
/// `host` is signed from `url` and left to the HTTP client.
pub fn sign_request(
    credentials: &Credentials,
    region: &str,
    service: &str,
    method: &str,
    url: &Url,
    body: &[u8],
    time: SystemTime,
) -> Result<Vec<(String, String)>, AuthError> {
    let identity: Identity = credentials.clone().into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(service)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| AuthError::Signing(e.to_string()))?
        .into();

    let request = SignableRequest::new(
        method,
        url.as_str(),
        std::iter::empty(),
        SignableBody::Bytes(body),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))?;

    let (instructions, _signature) = sign(request, &params)
        .map_err(|e| AuthError::Signing(e.to_string()))?
        .into_parts();

    Ok(instructions
        .headers()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("host"))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}
