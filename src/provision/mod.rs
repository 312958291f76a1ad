//! Deployment reconciler
//!
//! Brings the remote Lambda + API Gateway configuration to the desired state.
//! Nothing is stored locally: every run re-reads the remote state, so every
//! step can be re-run from the top after a failure.
//!
//! # Architecture
//!
//! - [`api`] - the [`ProvisioningApi`] capability the steps run against
//! - [`function`] - create-or-update of the Lambda function
//! - [`rest_api`] - lookup-or-create of the REST API by name
//! - [`resources`] - resource tree reconciliation
//! - [`method`] - GET method, responses and Lambda integration
//! - [`permission`] - invoke permission for API Gateway
//! - [`deployment`] - stage deployment and invoke URL
//! - [`pipeline`] - the steps above in dependency order

pub mod api;
pub mod deployment;
pub mod function;
pub mod method;
pub mod permission;
pub mod pipeline;
pub mod resources;
pub mod rest_api;

pub use api::ProvisioningApi;
pub use pipeline::{deploy, DeployOutcome};

use crate::error::RemoteError;

#[derive(thiserror::Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("parent resource {parent} must be created before {path}")]
    MissingParent { parent: String, path: String },
    #[error("resource {0} could not be resolved after reconciliation")]
    Unresolved(String),
    #[error("invalid resource path {0:?}: must start with '/' and have no empty segments")]
    InvalidPath(String),
    #[error("malformed policy document: {0}")]
    MalformedPolicy(#[source] serde_json::Error),
    #[error("cannot derive a region from source ARN {0:?}")]
    InvalidSourceArn(String),
}
