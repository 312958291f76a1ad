use anyhow::{Context, Result};
use cf_md_to_html::aws::auth::AwsCredentials;
use cf_md_to_html::aws::client::AwsClient;
use cf_md_to_html::config::DeployConfig;
use cf_md_to_html::provision;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Deploy the Contentful Markdown-to-HTML proxy to Lambda + API Gateway
#[derive(Parser, Debug)]
#[command(name = "cf-md-to-html", version, about, long_about = None)]
struct Args {
    /// Deployment config file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// AWS region to deploy to
    #[arg(short, long, env = "AWS_DEFAULT_REGION")]
    region: Option<String>,

    /// AWS account id owning the API
    #[arg(long, env = "AWS_ACCOUNT_ID")]
    account_id: Option<String>,

    /// Name of the REST API
    #[arg(long)]
    api_name: Option<String>,

    /// Name of the Lambda function
    #[arg(long)]
    function_name: Option<String>,

    /// Execution role ARN for a newly created function
    #[arg(long)]
    role: Option<String>,

    /// Stage to deploy to (first segment of the public path)
    #[arg(long)]
    stage: Option<String>,

    /// Resource path below the stage
    #[arg(long)]
    resource_path: Option<String>,

    /// Zip archive holding the `bootstrap` binary
    #[arg(short, long)]
    package: Option<PathBuf>,

    /// Send Lambda and API Gateway calls to this endpoint instead of AWS
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

/// CLI / env > config file > defaults
fn resolve_config(args: &Args) -> Result<DeployConfig> {
    let mut config = DeployConfig::load(args.config.as_deref())?;

    if let Some(region) = &args.region {
        config.region = region.clone();
    }
    if let Some(account_id) = &args.account_id {
        config.account_id = account_id.clone();
    }
    if let Some(api_name) = &args.api_name {
        config.api_name = api_name.clone();
    }
    if let Some(function_name) = &args.function_name {
        config.function_name = function_name.clone();
    }
    if let Some(role) = &args.role {
        config.role = Some(role.clone());
    }
    if let Some(stage) = &args.stage {
        config.stage = stage.clone();
    }
    if let Some(resource_path) = &args.resource_path {
        config.resource_path = resource_path.clone();
    }
    if let Some(package) = &args.package {
        config.package = package.clone();
    }
    if let Some(endpoint) = &args.endpoint_url {
        config.endpoints.lambda = Some(endpoint.clone());
        config.endpoints.apigateway = Some(endpoint.clone());
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    tracing::info!(
        "Deploying {} to {} (account {})",
        config.function_name,
        config.region,
        config.account_id
    );

    let code = std::fs::read(&config.package)
        .with_context(|| format!("Failed to read package {}", config.package.display()))?;

    let credentials = AwsCredentials::load(&config.region).await?;
    let client =
        AwsClient::new(&config.region, credentials)?.with_endpoints(config.endpoints.clone());

    let outcome = provision::deploy(&client, &config, &code)
        .await
        .context("Deployment failed")?;

    println!("Deployed {}", outcome.invoke_url);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_guard = match setup_logging(args.log_level, args.log_file.as_ref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:?}");
            std::process::exit(1);
        }
    };

    let result = run(args).await;
    if let Err(err) = &result {
        tracing::error!("{:#}", err);
    }
    // Flush file logs before exiting
    drop(log_guard);

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
