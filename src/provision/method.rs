//! GET method wiring
//!
//! The public `GET /spaces/{spaceId}/entries` method is wired to the Lambda
//! function through a non-proxy (`AWS`) integration. The request template
//! forwards the path's space id, the raw query string and the
//! `Authorization` header as the invocation event.

use super::api::{
    IntegrationResponseSpec, IntegrationSpec, MethodResponseSpec, MethodSpec, ProvisioningApi,
};
use super::ProvisionError;
use std::collections::BTreeMap;

pub const HTTP_METHOD: &str = "GET";

const STATUS_OK: &str = "200";
const CORS_ORIGIN_PARAMETER: &str = "method.response.header.Access-Control-Allow-Origin";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Invocation event produced from the incoming request
pub const REQUEST_TEMPLATE: &str = r#"{
  "spaceId": "$input.params('spaceId')",
  "query": "$input.params().querystring",
  "authorization": "$input.params('Authorization')"
}"#;

/// Integration URI invoking `function_arn` in `region`
pub fn lambda_integration_uri(region: &str, function_arn: &str) -> String {
    format!(
        "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
        region, function_arn
    )
}

/// Open GET method; both parameters are optional
pub fn get_method() -> MethodSpec {
    MethodSpec {
        http_method: HTTP_METHOD.to_string(),
        authorization_type: "NONE".to_string(),
        api_key_required: false,
        request_parameters: BTreeMap::from([
            ("method.request.header.Authorization".to_string(), false),
            ("method.request.path.spaceId".to_string(), false),
        ]),
    }
}

pub fn ok_method_response() -> MethodResponseSpec {
    MethodResponseSpec {
        status_code: STATUS_OK.to_string(),
        response_models: BTreeMap::new(),
        response_parameters: BTreeMap::from([(CORS_ORIGIN_PARAMETER.to_string(), false)]),
    }
}

/// Lambda integration. Lambda is always invoked with POST, whatever the
/// public verb is.
pub fn lambda_integration(target_uri: &str, request_template: &str) -> IntegrationSpec {
    IntegrationSpec {
        integration_type: "AWS".to_string(),
        integration_http_method: "POST".to_string(),
        uri: target_uri.to_string(),
        request_templates: BTreeMap::from([(
            JSON_CONTENT_TYPE.to_string(),
            request_template.to_string(),
        )]),
    }
}

pub fn ok_integration_response() -> IntegrationResponseSpec {
    IntegrationResponseSpec {
        status_code: STATUS_OK.to_string(),
        response_templates: BTreeMap::from([(JSON_CONTENT_TYPE.to_string(), String::new())]),
        response_parameters: BTreeMap::from([(CORS_ORIGIN_PARAMETER.to_string(), "'*'".to_string())]),
    }
}

/// Replace the GET method of `resource_id` with one integrated with `target_uri`.
///
/// Any existing GET method is deleted first so no stale integration settings
/// survive. Only a not-found on that delete is tolerated; every other failure
/// aborts and the whole deployment has to be re-run.
pub async fn wire_get(
    api: &dyn ProvisioningApi,
    rest_api_id: &str,
    resource_id: &str,
    target_uri: &str,
    request_template: &str,
) -> Result<(), ProvisionError> {
    match api.delete_method(rest_api_id, resource_id, HTTP_METHOD).await {
        Ok(()) => tracing::debug!("Deleted previous {} method on {}", HTTP_METHOD, resource_id),
        Err(err) if err.is_not_found() => {
            tracing::debug!("No previous {} method on {}", HTTP_METHOD, resource_id)
        }
        Err(err) => return Err(err.into()),
    }

    api.put_method(rest_api_id, resource_id, &get_method()).await?;
    tracing::info!("Created method {} on {}", HTTP_METHOD, resource_id);

    api.put_method_response(rest_api_id, resource_id, HTTP_METHOD, &ok_method_response())
        .await?;

    api.put_integration(
        rest_api_id,
        resource_id,
        HTTP_METHOD,
        &lambda_integration(target_uri, request_template),
    )
    .await?;
    tracing::debug!("Integrated {} {} with {}", HTTP_METHOD, resource_id, target_uri);

    api.put_integration_response(rest_api_id, resource_id, HTTP_METHOD, &ok_integration_response())
        .await?;

    Ok(())
}
