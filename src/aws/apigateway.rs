//! AWS API Gateway (REST APIs)
//!
//! REST API, resource tree, method and deployment calls.

use super::client::AwsClient;
use crate::error::RemoteError;
use crate::provision::api::{
    Deployment, IntegrationResponseSpec, IntegrationSpec, MethodResponseSpec, MethodSpec,
    Resource, RestApi,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

const SERVICE: &str = "apigateway";

/// Largest page API Gateway hands out
const PAGE_LIMIT: u32 = 500;

fn parse<T: DeserializeOwned>(operation: &str, value: Value) -> Result<T, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::invalid_response(operation, e.to_string()))
}

fn to_body<T: Serialize>(operation: &str, value: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(value).map_err(|e| RemoteError::invalid_response(operation, e.to_string()))
}

/// Fetch every page of a collection (follows the `position` cursor)
async fn list_all<T: DeserializeOwned>(
    client: &AwsClient,
    path: &str,
    operation: &str,
) -> Result<Vec<T>, RemoteError> {
    let signer = client.signer(&client.region, SERVICE);
    let mut all_items = Vec::new();
    let mut position: Option<String> = None;

    loop {
        let mut url = format!("{}?limit={}", client.apigateway_url(path), PAGE_LIMIT);
        if let Some(position) = &position {
            url.push_str(&format!("&position={}", urlencoding::encode(position)));
        }

        let response = client.http.get(&signer, &url, operation).await?;

        if let Some(items) = response.get("item").and_then(Value::as_array) {
            for item in items {
                all_items.push(parse(operation, item.clone())?);
            }
        }

        let next = response
            .get("position")
            .and_then(Value::as_str)
            .map(str::to_string);
        match next {
            None => break,
            Some(next) if position.as_deref() == Some(next.as_str()) => {
                tracing::warn!("{} returned the same position twice, stopping", operation);
                break;
            }
            Some(next) => position = Some(next),
        }
    }

    tracing::debug!("{} returned {} items", operation, all_items.len());
    Ok(all_items)
}

pub async fn list_rest_apis(client: &AwsClient) -> Result<Vec<RestApi>, RemoteError> {
    list_all(client, "restapis", "GetRestApis").await
}

pub async fn create_rest_api(client: &AwsClient, name: &str) -> Result<RestApi, RemoteError> {
    let url = client.apigateway_url("restapis");
    let response = client
        .http
        .post(
            &client.signer(&client.region, SERVICE),
            &url,
            "CreateRestApi",
            &json!({ "name": name }),
        )
        .await?;
    parse("CreateRestApi", response)
}

pub async fn list_resources(
    client: &AwsClient,
    rest_api_id: &str,
) -> Result<Vec<Resource>, RemoteError> {
    list_all(
        client,
        &format!("restapis/{}/resources", rest_api_id),
        "GetResources",
    )
    .await
}

pub async fn create_resource(
    client: &AwsClient,
    rest_api_id: &str,
    parent_id: &str,
    path_part: &str,
) -> Result<Resource, RemoteError> {
    let url = client.apigateway_url(&format!("restapis/{}/resources/{}", rest_api_id, parent_id));
    let response = client
        .http
        .post(
            &client.signer(&client.region, SERVICE),
            &url,
            "CreateResource",
            &json!({ "pathPart": path_part }),
        )
        .await?;
    parse("CreateResource", response)
}

pub async fn delete_method(
    client: &AwsClient,
    rest_api_id: &str,
    resource_id: &str,
    http_method: &str,
) -> Result<(), RemoteError> {
    let url = client.apigateway_method_url(rest_api_id, resource_id, http_method, None);
    client
        .http
        .delete(&client.signer(&client.region, SERVICE), &url, "DeleteMethod")
        .await?;
    Ok(())
}

pub async fn put_method(
    client: &AwsClient,
    rest_api_id: &str,
    resource_id: &str,
    method: &MethodSpec,
) -> Result<(), RemoteError> {
    let url = client.apigateway_method_url(rest_api_id, resource_id, &method.http_method, None);
    let body = to_body("PutMethod", method)?;
    client
        .http
        .put(&client.signer(&client.region, SERVICE), &url, "PutMethod", &body)
        .await?;
    Ok(())
}

pub async fn put_method_response(
    client: &AwsClient,
    rest_api_id: &str,
    resource_id: &str,
    http_method: &str,
    response: &MethodResponseSpec,
) -> Result<(), RemoteError> {
    let url = client.apigateway_method_url(
        rest_api_id,
        resource_id,
        http_method,
        Some(&format!("responses/{}", response.status_code)),
    );
    let body = to_body("PutMethodResponse", response)?;
    client
        .http
        .put(&client.signer(&client.region, SERVICE), &url, "PutMethodResponse", &body)
        .await?;
    Ok(())
}

pub async fn put_integration(
    client: &AwsClient,
    rest_api_id: &str,
    resource_id: &str,
    http_method: &str,
    integration: &IntegrationSpec,
) -> Result<(), RemoteError> {
    let url = client.apigateway_method_url(rest_api_id, resource_id, http_method, Some("integration"));
    let body = to_body("PutIntegration", integration)?;
    client
        .http
        .put(&client.signer(&client.region, SERVICE), &url, "PutIntegration", &body)
        .await?;
    Ok(())
}

pub async fn put_integration_response(
    client: &AwsClient,
    rest_api_id: &str,
    resource_id: &str,
    http_method: &str,
    response: &IntegrationResponseSpec,
) -> Result<(), RemoteError> {
    let url = client.apigateway_method_url(
        rest_api_id,
        resource_id,
        http_method,
        Some(&format!("integration/responses/{}", response.status_code)),
    );
    let body = to_body("PutIntegrationResponse", response)?;
    client
        .http
        .put(
            &client.signer(&client.region, SERVICE),
            &url,
            "PutIntegrationResponse",
            &body,
        )
        .await?;
    Ok(())
}

pub async fn create_deployment(
    client: &AwsClient,
    rest_api_id: &str,
    stage_name: &str,
) -> Result<Deployment, RemoteError> {
    let url = client.apigateway_url(&format!("restapis/{}/deployments", rest_api_id));
    let response = client
        .http
        .post(
            &client.signer(&client.region, SERVICE),
            &url,
            "CreateDeployment",
            &json!({ "stageName": stage_name }),
        )
        .await?;
    parse("CreateDeployment", response)
}
