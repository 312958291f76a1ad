//! Deployment pipeline
//!
//! Runs the reconciliation steps in dependency order. Each step needs an
//! identifier produced by the one before it, so nothing runs concurrently and
//! the first failure stops the run. Steps already applied stay applied; the
//! pipeline is meant to be re-run from the top.

use super::api::{FunctionSpec, ProvisioningApi};
use super::deployment::{invoke_url, publish_deployment};
use super::function::publish_function;
use super::method::{lambda_integration_uri, wire_get, HTTP_METHOD, REQUEST_TEMPLATE};
use super::permission::{grant_invoke, method_source_arn};
use super::resources::ensure_path;
use super::rest_api::get_or_create_rest_api;
use super::ProvisionError;
use crate::config::DeployConfig;

/// Identifiers produced by a successful deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub function_arn: String,
    pub rest_api_id: String,
    pub resource_id: String,
    pub source_arn: String,
    pub deployment_id: String,
    pub invoke_url: String,
}

/// Deploy `code` as the handler function and expose it through API Gateway
pub async fn deploy(
    api: &dyn ProvisioningApi,
    config: &DeployConfig,
    code: &[u8],
) -> Result<DeployOutcome, ProvisionError> {
    let role = config.role_arn();

    // Step 1: function
    let function_arn = publish_function(
        api,
        &config.region,
        &FunctionSpec {
            name: &config.function_name,
            role: &role,
            runtime: &config.runtime,
            handler: &config.handler,
            code,
        },
    )
    .await?;
    tracing::info!("Published lambda function {} ({})", config.function_name, function_arn);

    // Step 2: REST API
    let rest_api = get_or_create_rest_api(api, &config.api_name).await?;
    tracing::info!("Using REST API {} ({})", rest_api.name, rest_api.id);

    // Step 3: resource tree
    let resource_id = ensure_path(api, &rest_api.id, &config.resource_path).await?;
    tracing::info!("Resource {} is {}", config.resource_path, resource_id);

    // Step 4: method + integration
    wire_get(
        api,
        &rest_api.id,
        &resource_id,
        &lambda_integration_uri(&config.region, &function_arn),
        REQUEST_TEMPLATE,
    )
    .await?;
    tracing::info!("Wired {} {} to {}", HTTP_METHOD, config.resource_path, config.function_name);

    // Step 5: invoke permission
    let source_arn = method_source_arn(
        &config.region,
        &config.account_id,
        &rest_api.id,
        HTTP_METHOD,
        &config.resource_path,
    );
    tracing::info!("Granting invoke permission to {}", source_arn);
    grant_invoke(api, &config.function_name, &source_arn).await?;

    // Step 6: stage
    let deployment_id = publish_deployment(api, &rest_api.id, &config.stage).await?;
    let invoke_url = invoke_url(&rest_api.id, &config.region, &config.stage, &config.resource_path);
    tracing::info!("Deployed {}", invoke_url);

    Ok(DeployOutcome {
        function_arn,
        rest_api_id: rest_api.id,
        resource_id,
        source_arn,
        deployment_id,
        invoke_url,
    })
}
