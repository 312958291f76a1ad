//! Remote provisioning API
//!
//! The reconciler only sees the cloud through [`ProvisioningApi`]. The AWS
//! implementation lives in [`crate::aws`]; tests use an in-memory fake.

use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Function to create when it does not exist yet
#[derive(Debug, Clone)]
pub struct FunctionSpec<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub runtime: &'a str,
    pub handler: &'a str,
    pub code: &'a [u8],
}

/// Function configuration as returned by the remote
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionInfo {
    pub function_name: String,
    pub function_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestApi {
    pub id: String,
    pub name: String,
}

/// One node of an API's resource tree
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub path: String,
    #[serde(default)]
    pub path_part: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSpec {
    #[serde(skip)]
    pub http_method: String,
    pub authorization_type: String,
    pub api_key_required: bool,
    /// `method.request.{location}.{name}` → required
    pub request_parameters: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodResponseSpec {
    #[serde(skip)]
    pub status_code: String,
    pub response_models: BTreeMap<String, String>,
    pub response_parameters: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSpec {
    #[serde(rename = "type")]
    pub integration_type: String,
    /// Verb used to call the backend, independent of the public verb
    #[serde(rename = "httpMethod")]
    pub integration_http_method: String,
    pub uri: String,
    pub request_templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationResponseSpec {
    #[serde(skip)]
    pub status_code: String,
    pub response_templates: BTreeMap<String, String>,
    pub response_parameters: BTreeMap<String, String>,
}

/// Statement to append to a function's resource policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionSpec {
    pub statement_id: String,
    pub action: String,
    pub principal: String,
    pub source_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deployment {
    pub id: String,
}

/// Operations the reconciler needs from the cloud.
///
/// Every call may fail with [`crate::error::ErrorKind::NotFound`] or any other
/// kind; the reconciler decides which failures are recoverable.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    // Functions

    async fn update_function_code(
        &self,
        region: &str,
        function_name: &str,
        code: &[u8],
    ) -> Result<FunctionInfo, RemoteError>;

    async fn create_function(
        &self,
        region: &str,
        spec: &FunctionSpec<'_>,
    ) -> Result<FunctionInfo, RemoteError>;

    /// Raw JSON policy document attached to the function
    async fn get_policy(&self, region: &str, function_name: &str) -> Result<String, RemoteError>;

    async fn add_permission(
        &self,
        region: &str,
        function_name: &str,
        permission: &PermissionSpec,
    ) -> Result<(), RemoteError>;

    // Gateway

    async fn list_rest_apis(&self) -> Result<Vec<RestApi>, RemoteError>;

    async fn create_rest_api(&self, name: &str) -> Result<RestApi, RemoteError>;

    async fn list_resources(&self, rest_api_id: &str) -> Result<Vec<Resource>, RemoteError>;

    async fn create_resource(
        &self,
        rest_api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<Resource, RemoteError>;

    async fn delete_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<(), RemoteError>;

    async fn put_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        method: &MethodSpec,
    ) -> Result<(), RemoteError>;

    async fn put_method_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &MethodResponseSpec,
    ) -> Result<(), RemoteError>;

    async fn put_integration(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        integration: &IntegrationSpec,
    ) -> Result<(), RemoteError>;

    async fn put_integration_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &IntegrationResponseSpec,
    ) -> Result<(), RemoteError>;

    async fn create_deployment(
        &self,
        rest_api_id: &str,
        stage_name: &str,
    ) -> Result<Deployment, RemoteError>;
}
