use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub delete_event_topic_arn: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP storage gateway over S3 and SNS")]
pub struct Args {
    /// Host to bind to (overrides STORAGE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides STORAGE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// AWS region for S3 and SNS (overrides STORAGE_GATEWAY_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3/SNS endpoint, e.g. a local S3-compatible server
    /// (overrides STORAGE_GATEWAY_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing (overrides STORAGE_GATEWAY_FORCE_PATH_STYLE)
    #[arg(long)]
    pub force_path_style: bool,

    /// SNS topic that receives delete events (overrides STORAGE_GATEWAY_DELETE_EVENT_TOPIC)
    #[arg(long)]
    pub delete_event_topic: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("STORAGE_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("STORAGE_GATEWAY_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing STORAGE_GATEWAY_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 8080,
            Err(err) => return Err(err).context("reading STORAGE_GATEWAY_PORT"),
        };
        let env_region = env::var("STORAGE_GATEWAY_REGION").unwrap_or_else(|_| "eu-west-2".into());
        let env_endpoint = env::var("STORAGE_GATEWAY_ENDPOINT_URL").ok();
        let env_path_style = match env::var("STORAGE_GATEWAY_FORCE_PATH_STYLE") {
            Ok(value) => value.parse::<bool>().with_context(|| {
                format!("parsing STORAGE_GATEWAY_FORCE_PATH_STYLE value `{}`", value)
            })?,
            Err(_) => false,
        };
        let env_topic = env::var("STORAGE_GATEWAY_DELETE_EVENT_TOPIC").ok();

        // --- Merge ---
        let delete_event_topic_arn = args
            .delete_event_topic
            .or(env_topic)
            .context("a delete event topic is required (STORAGE_GATEWAY_DELETE_EVENT_TOPIC)")?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            region: args.region.unwrap_or(env_region),
            endpoint_url: args.endpoint_url.or(env_endpoint),
            force_path_style: args.force_path_style || env_path_style,
            access_key_id: non_blank(env::var("STORAGE_GATEWAY_ACCESS_KEY_ID").ok()),
            secret_access_key: non_blank(env::var("STORAGE_GATEWAY_SECRET_ACCESS_KEY").ok()),
            delete_event_topic_arn,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Static credentials, only when both halves are configured.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

// Secrets stay out of the startup log line.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("delete_event_topic_arn", &self.delete_event_topic_arn)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
