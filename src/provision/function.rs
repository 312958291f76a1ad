//! Lambda function publishing

use super::api::{FunctionSpec, ProvisioningApi};
use super::ProvisionError;

/// Make sure `spec.name` exists with `spec.code` and return its ARN.
///
/// The code of an existing function is updated in place. Only when the update
/// reports that the function does not exist is it created with the role,
/// runtime and handler from `spec`. Any other failure is returned unchanged.
pub async fn publish_function(
    api: &dyn ProvisioningApi,
    region: &str,
    spec: &FunctionSpec<'_>,
) -> Result<String, ProvisionError> {
    match api.update_function_code(region, spec.name, spec.code).await {
        Ok(function) => {
            tracing::info!("Updated code of lambda function {}", spec.name);
            Ok(function.function_arn)
        }
        Err(err) if err.is_not_found() => {
            tracing::info!(
                "Lambda function {} not found, creating it (runtime {}, handler {})",
                spec.name,
                spec.runtime,
                spec.handler
            );
            let function = api.create_function(region, spec).await?;
            Ok(function.function_arn)
        }
        Err(err) => Err(err.into()),
    }
}
