//! Contentful Markdown-to-HTML proxy on AWS Lambda + API Gateway.
//!
//! - [`provision`] reconciles the Lambda function and the API Gateway REST API
//!   that exposes it
//! - [`handler`] is the code running inside the function
//! - [`aws`] talks to the AWS control plane

pub mod aws;
pub mod config;
pub mod error;
pub mod handler;
pub mod provision;
