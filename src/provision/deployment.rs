//! Stage deployment

use super::api::ProvisioningApi;
use super::ProvisionError;

/// Snapshot the API into `stage_name` and return the deployment id.
///
/// A new deployment is created on every run; API Gateway points the stage at it.
pub async fn publish_deployment(
    api: &dyn ProvisioningApi,
    rest_api_id: &str,
    stage_name: &str,
) -> Result<String, ProvisionError> {
    let deployment = api.create_deployment(rest_api_id, stage_name).await?;
    tracing::info!(
        "Deployed {} to stage {} (deployment {})",
        rest_api_id,
        stage_name,
        deployment.id
    );
    Ok(deployment.id)
}

/// Public URL of `resource_path` once deployed to `stage_name`
pub fn invoke_url(rest_api_id: &str, region: &str, stage_name: &str, resource_path: &str) -> String {
    format!(
        "https://{}.execute-api.{}.amazonaws.com/{}{}",
        rest_api_id, region, stage_name, resource_path
    )
}
