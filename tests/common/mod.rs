//! In-memory stand-in for the Lambda and API Gateway control planes.
//!
//! Mirrors the remote behaviour the reconciler depends on: children need an
//! existing parent, deleting a missing method is a not-found, a function
//! without statements has no policy. Every call is recorded.

#![allow(dead_code)]

use async_trait::async_trait;
use cf_md_to_html::error::{ErrorKind, RemoteError};
use cf_md_to_html::provision::api::{
    Deployment, FunctionInfo, FunctionSpec, IntegrationResponseSpec, IntegrationSpec,
    MethodResponseSpec, MethodSpec, PermissionSpec, ProvisioningApi, Resource, RestApi,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const ACCOUNT_ID: &str = "123456789012";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    UpdateFunctionCode { name: String, code: Vec<u8> },
    CreateFunction { name: String, role: String, code: Vec<u8> },
    GetPolicy { region: String, function: String },
    AddPermission { region: String, function: String, source_arn: String },
    ListRestApis,
    CreateRestApi { name: String },
    ListResources { api: String },
    CreateResource { parent_id: String, path_part: String },
    DeleteMethod { resource_id: String, http_method: String },
    PutMethod { resource_id: String, http_method: String },
    PutMethodResponse { resource_id: String, status_code: String },
    PutIntegration { resource_id: String, backend_method: String, uri: String },
    PutIntegrationResponse { resource_id: String, status_code: String },
    CreateDeployment { api: String, stage: String },
}

#[derive(Default)]
struct State {
    functions: HashMap<String, Vec<u8>>,
    statements: HashMap<String, Vec<Value>>,
    rest_apis: Vec<RestApi>,
    resources: HashMap<String, Vec<Resource>>,
    methods: HashSet<(String, String)>,
    deployments: u32,
    next_id: u32,
    failures: HashMap<&'static str, ErrorKind>,
    calls: Vec<Call>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn check(&mut self, operation: &'static str) -> Result<(), RemoteError> {
        match self.failures.remove(operation) {
            Some(ErrorKind::NotFound) => Err(RemoteError::not_found(operation, "injected")),
            Some(ErrorKind::Upstream) => Err(RemoteError::Upstream("injected".into())),
            Some(ErrorKind::Other) => Err(RemoteError::Api {
                operation: operation.to_string(),
                status: 500,
                code: "InternalFailure".to_string(),
                message: "injected".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeProvisioning {
    state: Mutex<State>,
}

impl FakeProvisioning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `operation` fail with `kind`
    pub fn fail_next(&self, operation: &'static str, kind: ErrorKind) {
        self.state.lock().unwrap().failures.insert(operation, kind);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn seed_function(&self, name: &str, code: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .functions
            .insert(name.to_string(), code.to_vec());
    }

    pub fn function_code(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().functions.get(name).cloned()
    }

    pub fn seed_statement(&self, function: &str, statement: Value) {
        self.state
            .lock()
            .unwrap()
            .statements
            .entry(function.to_string())
            .or_default()
            .push(statement);
    }

    pub fn statements(&self, function: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .statements
            .get(function)
            .cloned()
            .unwrap_or_default()
    }

    /// REST API with only its root resource; returns the API id
    pub fn seed_rest_api(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let api_id = state.id("api");
        let root_id = state.id("root");
        state.rest_apis.push(RestApi {
            id: api_id.clone(),
            name: name.to_string(),
        });
        state.resources.insert(
            api_id.clone(),
            vec![Resource {
                id: root_id,
                parent_id: None,
                path: "/".to_string(),
                path_part: None,
            }],
        );
        api_id
    }

    /// REST API whose listing lacks the root resource
    pub fn seed_rootless_rest_api(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let api_id = state.id("api");
        state.rest_apis.push(RestApi {
            id: api_id.clone(),
            name: name.to_string(),
        });
        state.resources.insert(api_id.clone(), Vec::new());
        api_id
    }

    pub fn resource_paths(&self, api_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut paths: Vec<String> = state
            .resources
            .get(api_id)
            .map(|resources| resources.iter().map(|r| r.path.clone()).collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    pub fn resource_id(&self, api_id: &str, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .resources
            .get(api_id)?
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.id.clone())
    }

    pub fn seed_method(&self, resource_id: &str, http_method: &str) {
        self.state
            .lock()
            .unwrap()
            .methods
            .insert((resource_id.to_string(), http_method.to_string()));
    }

    pub fn has_method(&self, resource_id: &str, http_method: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .methods
            .contains(&(resource_id.to_string(), http_method.to_string()))
    }

    pub fn deployments(&self) -> u32 {
        self.state.lock().unwrap().deployments
    }
}

fn function_arn(region: &str, name: &str) -> String {
    format!("arn:aws:lambda:{}:{}:function:{}", region, ACCOUNT_ID, name)
}

#[async_trait]
impl ProvisioningApi for FakeProvisioning {
    async fn update_function_code(
        &self,
        region: &str,
        function_name: &str,
        code: &[u8],
    ) -> Result<FunctionInfo, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UpdateFunctionCode {
            name: function_name.to_string(),
            code: code.to_vec(),
        });
        state.check("UpdateFunctionCode")?;

        match state.functions.get_mut(function_name) {
            Some(existing) => {
                *existing = code.to_vec();
                Ok(FunctionInfo {
                    function_name: function_name.to_string(),
                    function_arn: function_arn(region, function_name),
                })
            }
            None => Err(RemoteError::not_found(
                "UpdateFunctionCode",
                format!("Function not found: {}", function_name),
            )),
        }
    }

    async fn create_function(
        &self,
        region: &str,
        spec: &FunctionSpec<'_>,
    ) -> Result<FunctionInfo, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateFunction {
            name: spec.name.to_string(),
            role: spec.role.to_string(),
            code: spec.code.to_vec(),
        });
        state.check("CreateFunction")?;

        state
            .functions
            .insert(spec.name.to_string(), spec.code.to_vec());
        Ok(FunctionInfo {
            function_name: spec.name.to_string(),
            function_arn: function_arn(region, spec.name),
        })
    }

    async fn get_policy(&self, region: &str, function_name: &str) -> Result<String, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetPolicy {
            region: region.to_string(),
            function: function_name.to_string(),
        });
        state.check("GetPolicy")?;

        match state.statements.get(function_name) {
            Some(statements) if !statements.is_empty() => Ok(json!({
                "Version": "2012-10-17",
                "Id": "default",
                "Statement": statements,
            })
            .to_string()),
            _ => Err(RemoteError::not_found("GetPolicy", "The resource you requested does not exist.")),
        }
    }

    async fn add_permission(
        &self,
        region: &str,
        function_name: &str,
        permission: &PermissionSpec,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::AddPermission {
            region: region.to_string(),
            function: function_name.to_string(),
            source_arn: permission.source_arn.clone(),
        });
        state.check("AddPermission")?;

        let statement = json!({
            "Sid": permission.statement_id,
            "Effect": "Allow",
            "Principal": { "Service": permission.principal },
            "Action": permission.action,
            "Resource": function_arn(region, function_name),
            "Condition": { "ArnLike": { "AWS:SourceArn": permission.source_arn } }
        });
        state
            .statements
            .entry(function_name.to_string())
            .or_default()
            .push(statement);
        Ok(())
    }

    async fn list_rest_apis(&self) -> Result<Vec<RestApi>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListRestApis);
        state.check("GetRestApis")?;
        Ok(state.rest_apis.clone())
    }

    async fn create_rest_api(&self, name: &str) -> Result<RestApi, RemoteError> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::CreateRestApi {
                name: name.to_string(),
            });
            state.check("CreateRestApi")?;
        }
        let id = self.seed_rest_api(name);
        Ok(RestApi {
            id,
            name: name.to_string(),
        })
    }

    async fn list_resources(&self, rest_api_id: &str) -> Result<Vec<Resource>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListResources {
            api: rest_api_id.to_string(),
        });
        state.check("GetResources")?;

        state
            .resources
            .get(rest_api_id)
            .cloned()
            .ok_or_else(|| RemoteError::not_found("GetResources", "Invalid API identifier specified"))
    }

    async fn create_resource(
        &self,
        rest_api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<Resource, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateResource {
            parent_id: parent_id.to_string(),
            path_part: path_part.to_string(),
        });
        state.check("CreateResource")?;

        let resources = state
            .resources
            .get(rest_api_id)
            .cloned()
            .unwrap_or_default();
        let Some(parent) = resources.iter().find(|r| r.id == parent_id) else {
            return Err(RemoteError::not_found(
                "CreateResource",
                "Invalid Resource identifier specified",
            ));
        };
        let path = if parent.path == "/" {
            format!("/{}", path_part)
        } else {
            format!("{}/{}", parent.path, path_part)
        };
        if resources.iter().any(|r| r.path == path) {
            return Err(RemoteError::Api {
                operation: "CreateResource".to_string(),
                status: 409,
                code: "ConflictException".to_string(),
                message: "Another resource with the same parent already has this name".to_string(),
            });
        }

        let resource = Resource {
            id: state.id("res"),
            parent_id: Some(parent_id.to_string()),
            path,
            path_part: Some(path_part.to_string()),
        };
        state
            .resources
            .entry(rest_api_id.to_string())
            .or_default()
            .push(resource.clone());
        Ok(resource)
    }

    async fn delete_method(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteMethod {
            resource_id: resource_id.to_string(),
            http_method: http_method.to_string(),
        });
        state.check("DeleteMethod")?;

        if state
            .methods
            .remove(&(resource_id.to_string(), http_method.to_string()))
        {
            Ok(())
        } else {
            Err(RemoteError::not_found("DeleteMethod", "Invalid Method identifier specified"))
        }
    }

    async fn put_method(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        method: &MethodSpec,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::PutMethod {
            resource_id: resource_id.to_string(),
            http_method: method.http_method.clone(),
        });
        state.check("PutMethod")?;

        let key = (resource_id.to_string(), method.http_method.clone());
        if !state.methods.insert(key) {
            return Err(RemoteError::Api {
                operation: "PutMethod".to_string(),
                status: 409,
                code: "ConflictException".to_string(),
                message: "Method already exists for this resource".to_string(),
            });
        }
        Ok(())
    }

    async fn put_method_response(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        _http_method: &str,
        response: &MethodResponseSpec,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::PutMethodResponse {
            resource_id: resource_id.to_string(),
            status_code: response.status_code.clone(),
        });
        state.check("PutMethodResponse")
    }

    async fn put_integration(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        _http_method: &str,
        integration: &IntegrationSpec,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::PutIntegration {
            resource_id: resource_id.to_string(),
            backend_method: integration.integration_http_method.clone(),
            uri: integration.uri.clone(),
        });
        state.check("PutIntegration")
    }

    async fn put_integration_response(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        _http_method: &str,
        response: &IntegrationResponseSpec,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::PutIntegrationResponse {
            resource_id: resource_id.to_string(),
            status_code: response.status_code.clone(),
        });
        state.check("PutIntegrationResponse")
    }

    async fn create_deployment(
        &self,
        rest_api_id: &str,
        stage_name: &str,
    ) -> Result<Deployment, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateDeployment {
            api: rest_api_id.to_string(),
            stage: stage_name.to_string(),
        });
        state.check("CreateDeployment")?;

        state.deployments += 1;
        Ok(Deployment {
            id: state.id("dep"),
        })
    }
}
