//! Lambda entry point for the request handler

use cf_md_to_html::config::HandlerConfig;
use cf_md_to_html::handler::{Handler, InvocationEvent};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch timestamps every line already
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();

    let config = HandlerConfig::from_env()?;
    tracing::info!(
        "Content API {} (text field TTL {:?})",
        config.content_api_url,
        config.text_fields_ttl
    );
    let handler = Handler::new(&config)?;
    let handler = &handler;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<InvocationEvent>| async move {
            handler.handle(event.payload).await.map_err(|err| {
                tracing::error!("Request failed: {}", err);
                Error::from(err)
            })
        },
    ))
    .await
}
