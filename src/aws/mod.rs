//! AWS API interaction module
//!
//! Signed REST calls against the Lambda and API Gateway control planes.
//!
//! # Module Structure
//!
//! - [`auth`] - credential resolution and Signature Version 4
//! - [`client`] - main AWS client and endpoint URL helpers
//! - [`http`] - signed HTTP calls and error classification
//! - [`lambda`] - function code and policy operations
//! - [`apigateway`] - REST API, resource, method and deployment operations
//!
//! [`AwsClient`](client::AwsClient) implements
//! [`ProvisioningApi`](crate::provision::ProvisioningApi).
//!
//! # Example
//!
//! ```ignore
//! use cf_md_to_html::aws::{auth::AwsCredentials, client::AwsClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AwsClient::new("eu-west-1", AwsCredentials::load("eu-west-1").await?)?;
//!     let apis = cf_md_to_html::aws::apigateway::list_rest_apis(&client).await?;
//!     Ok(())
//! }
//! ```

pub mod apigateway;
pub mod auth;
pub mod client;
pub mod http;
pub mod lambda;
mod provisioning;
