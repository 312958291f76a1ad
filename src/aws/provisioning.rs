//! [`ProvisioningApi`] backed by the real AWS REST APIs

use super::client::AwsClient;
use super::{apigateway, lambda};
use crate::error::RemoteError;
use crate::provision::api::{
    Deployment, FunctionInfo, FunctionSpec, IntegrationResponseSpec, IntegrationSpec,
    MethodResponseSpec, MethodSpec, PermissionSpec, ProvisioningApi, Resource, RestApi,
};
use async_trait::async_trait;

#[async_trait]
impl ProvisioningApi for AwsClient {
    async fn update_function_code(
        &self,
        region: &str,
        function_name: &str,
        code: &[u8],
    ) -> Result<FunctionInfo, RemoteError> {
        lambda::update_function_code(self, region, function_name, code).await
    }

    async fn create_function(
        &self,
        region: &str,
        spec: &FunctionSpec<'_>,
    ) -> Result<FunctionInfo, RemoteError> {
        lambda::create_function(self, region, spec).await
    }

    async fn get_policy(&self, region: &str, function_name: &str) -> Result<String, RemoteError> {
        lambda::get_policy(self, region, function_name).await
    }

    async fn add_permission(
        &self,
        region: &str,
        function_name: &str,
        permission: &PermissionSpec,
    ) -> Result<(), RemoteError> {
        lambda::add_permission(self, region, function_name, permission).await
    }

    async fn list_rest_apis(&self) -> Result<Vec<RestApi>, RemoteError> {
        apigateway::list_rest_apis(self).await
    }

    async fn create_rest_api(&self, name: &str) -> Result<RestApi, RemoteError> {
        apigateway::create_rest_api(self, name).await
    }

    async fn list_resources(&self, rest_api_id: &str) -> Result<Vec<Resource>, RemoteError> {
        apigateway::list_resources(self, rest_api_id).await
    }

    async fn create_resource(
        &self,
        rest_api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<Resource, RemoteError> {
        apigateway::create_resource(self, rest_api_id, parent_id, path_part).await
    }

    async fn delete_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<(), RemoteError> {
        apigateway::delete_method(self, rest_api_id, resource_id, http_method).await
    }

    async fn put_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        method: &MethodSpec,
    ) -> Result<(), RemoteError> {
        apigateway::put_method(self, rest_api_id, resource_id, method).await
    }

    async fn put_method_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &MethodResponseSpec,
    ) -> Result<(), RemoteError> {
        apigateway::put_method_response(self, rest_api_id, resource_id, http_method, response).await
    }

    async fn put_integration(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        integration: &IntegrationSpec,
    ) -> Result<(), RemoteError> {
        apigateway::put_integration(self, rest_api_id, resource_id, http_method, integration).await
    }

    async fn put_integration_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        response: &IntegrationResponseSpec,
    ) -> Result<(), RemoteError> {
        apigateway::put_integration_response(self, rest_api_id, resource_id, http_method, response)
            .await
    }

    async fn create_deployment(
        &self,
        rest_api_id: &str,
        stage_name: &str,
    ) -> Result<Deployment, RemoteError> {
        apigateway::create_deployment(self, rest_api_id, stage_name).await
    }
}
