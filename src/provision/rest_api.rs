//! REST API lookup

use super::api::{ProvisioningApi, RestApi};
use super::ProvisionError;

/// Return the first REST API called `name`, creating one when none exists.
///
/// Names are not unique in API Gateway; duplicates created outside this tool
/// are ignored in favour of the first one listed.
pub async fn get_or_create_rest_api(
    api: &dyn ProvisioningApi,
    name: &str,
) -> Result<RestApi, ProvisionError> {
    let apis = api.list_rest_apis().await?;
    let mut matching = apis.into_iter().filter(|rest_api| rest_api.name == name);

    if let Some(existing) = matching.next() {
        if matching.next().is_some() {
            tracing::warn!("Several REST APIs are named {}, using {}", name, existing.id);
        }
        tracing::debug!("Reusing REST API {} ({})", name, existing.id);
        return Ok(existing);
    }

    tracing::info!("Creating REST API {}", name);
    Ok(api.create_rest_api(name).await?)
}
