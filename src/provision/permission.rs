//! Invoke permission for API Gateway

use super::api::{PermissionSpec, ProvisioningApi};
use super::ProvisionError;
use serde_json::Value;

pub const INVOKE_ACTION: &str = "lambda:InvokeFunction";
pub const GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// What [`grant_invoke`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    AlreadyGranted,
    Granted { statement_id: String },
}

/// ARN that callers of `http_method` on `resource_path` present to Lambda.
///
/// Path variables become wildcards: `/{spaceId}/entries` → `/*/entries`.
pub fn method_source_arn(
    region: &str,
    account_id: &str,
    rest_api_id: &str,
    http_method: &str,
    resource_path: &str,
) -> String {
    let path = resource_path
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "*"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    format!(
        "arn:aws:execute-api:{}:{}:{}/*/{}{}",
        region, account_id, rest_api_id, http_method, path
    )
}

/// Region field of an ARN (`arn:partition:service:region:...`)
pub fn region_from_arn(arn: &str) -> Result<&str, ProvisionError> {
    let mut fields = arn.split(':');
    match (fields.next(), fields.nth(2)) {
        (Some("arn"), Some(region)) if !region.is_empty() => Ok(region),
        _ => Err(ProvisionError::InvalidSourceArn(arn.to_string())),
    }
}

/// Whether `statement` lets API Gateway invoke the function from `source_arn`.
///
/// Only effect, action, principal and the source ARN condition are compared;
/// statement ids and any other fields are ignored.
pub fn grants_invoke(statement: &Value, source_arn: &str) -> bool {
    statement["Effect"] == "Allow"
        && statement["Action"] == INVOKE_ACTION
        && statement["Principal"]["Service"] == GATEWAY_PRINCIPAL
        && statement["Condition"]["ArnLike"]["AWS:SourceArn"] == source_arn
}

/// Statements of a policy document; a lone statement object is accepted too
fn statements(policy: &str) -> Result<Vec<Value>, ProvisionError> {
    let document: Value = serde_json::from_str(policy).map_err(ProvisionError::MalformedPolicy)?;
    Ok(match document.get("Statement") {
        Some(Value::Array(statements)) => statements.clone(),
        Some(statement @ Value::Object(_)) => vec![statement.clone()],
        _ => Vec::new(),
    })
}

/// Allow API Gateway to invoke `function_name` for `source_arn`, once.
///
/// The call is made in the region named by `source_arn`. A function without
/// a policy counts as having no statements.
pub async fn grant_invoke(
    api: &dyn ProvisioningApi,
    function_name: &str,
    source_arn: &str,
) -> Result<GrantOutcome, ProvisionError> {
    let region = region_from_arn(source_arn)?;

    let existing = match api.get_policy(region, function_name).await {
        Ok(policy) => statements(&policy)?,
        Err(err) if err.is_not_found() => {
            tracing::debug!("Function {} has no resource policy yet", function_name);
            Vec::new()
        }
        Err(err) => return Err(err.into()),
    };

    if existing.iter().any(|statement| grants_invoke(statement, source_arn)) {
        tracing::info!("Invoke permission for {} already granted", source_arn);
        return Ok(GrantOutcome::AlreadyGranted);
    }

    let permission = PermissionSpec {
        statement_id: uuid::Uuid::new_v4().simple().to_string(),
        action: INVOKE_ACTION.to_string(),
        principal: GATEWAY_PRINCIPAL.to_string(),
        source_arn: source_arn.to_string(),
    };
    api.add_permission(region, function_name, &permission).await?;
    tracing::info!(
        "Granted invoke permission to {} (statement {})",
        source_arn,
        permission.statement_id
    );

    Ok(GrantOutcome::Granted {
        statement_id: permission.statement_id,
    })
}
