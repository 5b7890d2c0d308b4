use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use services::{
    notification::SnsPublisher, s3_gateway::S3Gateway, storage_service::StorageService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!("Starting storage-gateway with config: {:?}", cfg);

    // --- AWS clients ---
    let sdk = load_sdk_config(&cfg).await;
    let s3 = aws_sdk_s3::Client::from_conf(
        aws_sdk_s3::config::Builder::from(&sdk)
            .force_path_style(cfg.force_path_style)
            .build(),
    );
    let sns = aws_sdk_sns::Client::new(&sdk);

    // --- Initialize core service ---
    let storage = StorageService::new(
        Arc::new(S3Gateway::new(s3, cfg.region.clone())),
        Arc::new(SnsPublisher::new(sns, cfg.delete_event_topic_arn.clone())),
    );

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(storage);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared SDK config for S3 and SNS. Static keys and an endpoint override
/// are only applied when configured; otherwise the default provider chain
/// and the regional AWS endpoints are used.
async fn load_sdk_config(cfg: &AppConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(cfg.region.clone()));

    if let Some(endpoint) = &cfg.endpoint_url {
        tracing::info!("Using endpoint override {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }
    if let Some((access_key_id, secret_access_key)) = cfg.static_credentials() {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "storage-gateway-config",
        ));
    }

    loader.load().await
}
