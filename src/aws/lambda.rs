//! AWS Lambda
//!
//! Function code publishing and resource-policy calls.

use super::client::AwsClient;
use crate::error::RemoteError;
use crate::provision::api::{FunctionInfo, FunctionSpec, PermissionSpec};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

const SERVICE: &str = "lambda";

fn parse_function(operation: &str, response: Value) -> Result<FunctionInfo, RemoteError> {
    serde_json::from_value(response)
        .map_err(|e| RemoteError::invalid_response(operation, e.to_string()))
}

/// Replace the code of an existing function
pub async fn update_function_code(
    client: &AwsClient,
    region: &str,
    function_name: &str,
    code: &[u8],
) -> Result<FunctionInfo, RemoteError> {
    let url = client.lambda_function_url(region, function_name, Some("code"));
    let body = json!({ "ZipFile": STANDARD.encode(code) });
    let response = client
        .http
        .put(&client.signer(region, SERVICE), &url, "UpdateFunctionCode", &body)
        .await?;
    parse_function("UpdateFunctionCode", response)
}

/// Create a function from a zip payload
pub async fn create_function(
    client: &AwsClient,
    region: &str,
    spec: &FunctionSpec<'_>,
) -> Result<FunctionInfo, RemoteError> {
    let url = client.lambda_url(region, "functions");
    let body = json!({
        "FunctionName": spec.name,
        "Role": spec.role,
        "Runtime": spec.runtime,
        "Handler": spec.handler,
        "Code": { "ZipFile": STANDARD.encode(spec.code) },
    });
    let response = client
        .http
        .post(&client.signer(region, SERVICE), &url, "CreateFunction", &body)
        .await?;
    parse_function("CreateFunction", response)
}

/// Fetch the function's resource policy document (a JSON string)
pub async fn get_policy(
    client: &AwsClient,
    region: &str,
    function_name: &str,
) -> Result<String, RemoteError> {
    let url = client.lambda_function_url(region, function_name, Some("policy"));
    let response = client
        .http
        .get(&client.signer(region, SERVICE), &url, "GetPolicy")
        .await?;

    response
        .get("Policy")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RemoteError::invalid_response("GetPolicy", "missing Policy field"))
}

/// Append a statement to the function's resource policy
pub async fn add_permission(
    client: &AwsClient,
    region: &str,
    function_name: &str,
    permission: &PermissionSpec,
) -> Result<(), RemoteError> {
    let url = client.lambda_function_url(region, function_name, Some("policy"));
    let body = serde_json::to_value(permission)
        .map_err(|e| RemoteError::invalid_response("AddPermission", e.to_string()))?;
    client
        .http
        .post(&client.signer(region, SERVICE), &url, "AddPermission", &body)
        .await?;
    Ok(())
}
