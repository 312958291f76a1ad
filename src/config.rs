//! Configuration Management
//!
//! Deployment settings are read from an optional YAML file and overridden by
//! CLI flags / environment variables in `main.rs`. The request handler reads
//! its settings from the Lambda environment.

use crate::aws::client::Endpoints;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_NAME: &str = "cf-md-to-html";

/// The stage name becomes the first path segment of the public URL. Using
/// `spaces` makes the proxy path identical to the Delivery API's
/// `/spaces/{spaceId}/entries`.
pub const DEFAULT_STAGE: &str = "spaces";
pub const DEFAULT_RESOURCE_PATH: &str = "/{spaceId}/entries";

pub const DEFAULT_CONTENT_API_URL: &str = "https://cdn.contentful.com";
pub const DEFAULT_TEXT_FIELDS_TTL: Duration = Duration::from_secs(30);

/// Deployment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub region: String,
    pub account_id: String,
    pub api_name: String,
    pub function_name: String,
    /// Execution role; defaults to the console's `lambda_basic_execution`
    pub role: Option<String>,
    pub stage: String,
    pub resource_path: String,
    pub runtime: String,
    pub handler: String,
    /// Zip archive containing the `bootstrap` binary
    pub package: PathBuf,
    pub endpoints: Endpoints,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            account_id: String::new(),
            api_name: DEFAULT_NAME.to_string(),
            function_name: DEFAULT_NAME.to_string(),
            role: None,
            stage: DEFAULT_STAGE.to_string(),
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            runtime: "provided.al2023".to_string(),
            handler: "bootstrap".to_string(),
            package: PathBuf::from("lambda.zip"),
            endpoints: Endpoints::default(),
        }
    }
}

impl DeployConfig {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cf-md-to-html").join("deploy.yaml"))
    }

    /// Load configuration from `path`, or from the default location when it
    /// exists. An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check the settings the pipeline cannot default
    pub fn validate(&self) -> Result<()> {
        if self.account_id.is_empty() {
            bail!("AWS account id must be set (AWS_ACCOUNT_ID or --account-id)");
        }
        if !self.account_id.chars().all(|c| c.is_ascii_digit()) {
            bail!("AWS account id must be numeric, got {:?}", self.account_id);
        }
        if !self.resource_path.starts_with('/') {
            bail!("Resource path must start with '/', got {:?}", self.resource_path);
        }
        if self.region.is_empty() {
            bail!("Region must not be empty");
        }
        Ok(())
    }

    /// Effective execution role ARN
    pub fn role_arn(&self) -> String {
        self.role.clone().unwrap_or_else(|| {
            format!("arn:aws:iam::{}:role/lambda_basic_execution", self.account_id)
        })
    }
}

/// Request handler configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerConfig {
    pub content_api_url: String,
    pub text_fields_ttl: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            content_api_url: DEFAULT_CONTENT_API_URL.to_string(),
            text_fields_ttl: DEFAULT_TEXT_FIELDS_TTL,
        }
    }
}

impl HandlerConfig {
    /// Read `CONTENT_API_URL` and `TEXT_FIELDS_TTL_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("CONTENT_API_URL").filter(|v| !v.is_empty()) {
            config.content_api_url = url;
        }
        if let Some(ttl) = lookup("TEXT_FIELDS_TTL_SECS").filter(|v| !v.is_empty()) {
            let secs: u64 = ttl
                .parse()
                .with_context(|| format!("TEXT_FIELDS_TTL_SECS is not a number: {:?}", ttl))?;
            config.text_fields_ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
