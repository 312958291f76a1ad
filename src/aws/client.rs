//! AWS Client
//!
//! Main client for the AWS APIs the deployer talks to, combining
//! credentials, request signing and the HTTP client.

use super::auth::{AwsCredentials, SigV4Signer};
use super::http::AwsHttpClient;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Optional base URLs replacing the regional AWS endpoints
/// (LocalStack, VPC endpoints, tests).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default)]
    pub lambda: Option<String>,
    #[serde(default)]
    pub apigateway: Option<String>,
}

/// Main AWS client
#[derive(Clone)]
pub struct AwsClient {
    pub http: AwsHttpClient,
    credentials: AwsCredentials,
    pub region: String,
    endpoints: Endpoints,
}

impl AwsClient {
    /// Create a new AWS client for `region`
    pub fn new(region: &str, credentials: AwsCredentials) -> Result<Self> {
        Ok(Self {
            http: AwsHttpClient::new()?,
            credentials,
            region: region.to_string(),
            endpoints: Endpoints::default(),
        })
    }

    /// Route requests to custom endpoints instead of `*.amazonaws.com`
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Signer for a service in a given region
    pub fn signer(&self, region: &str, service: &str) -> SigV4Signer {
        SigV4Signer::new(self.credentials.clone(), region, service)
    }

    // =========================================================================
    // Lambda API helpers
    // =========================================================================

    /// Build a Lambda API URL. Lambda calls carry their own region because
    /// permissions are granted in the region named by the source ARN.
    pub fn lambda_url(&self, region: &str, path: &str) -> String {
        let base = match &self.endpoints.lambda {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://lambda.{}.amazonaws.com", region),
        };
        format!("{}/2015-03-31/{}", base, path)
    }

    /// Build the URL of one function's sub-resource (`code`, `policy`, ...)
    pub fn lambda_function_url(&self, region: &str, function_name: &str, sub: Option<&str>) -> String {
        let name = urlencoding::encode(function_name);
        match sub {
            Some(sub) => self.lambda_url(region, &format!("functions/{}/{}", name, sub)),
            None => self.lambda_url(region, &format!("functions/{}", name)),
        }
    }

    // =========================================================================
    // API Gateway helpers
    // =========================================================================

    /// Build an API Gateway REST API URL
    pub fn apigateway_url(&self, path: &str) -> String {
        let base = match &self.endpoints.apigateway {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://apigateway.{}.amazonaws.com", self.region),
        };
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Build the URL of a method on a resource
    pub fn apigateway_method_url(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        sub: Option<&str>,
    ) -> String {
        let path = format!(
            "restapis/{}/resources/{}/methods/{}",
            rest_api_id, resource_id, http_method
        );
        match sub {
            Some(sub) => self.apigateway_url(&format!("{}/{}", path, sub)),
            None => self.apigateway_url(&path),
        }
    }
}
