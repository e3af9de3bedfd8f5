use anyhow::Context;

use truetag_api::app::{ApiConfig, build_app, build_services};
use truetag_engine::EngineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    truetag_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let engine = EngineConfig::from_env().context("invalid engine configuration")?;

    let services = build_services(&config, engine).context("failed to build services")?;
    let app = build_app(services, config.jwt_secret.clone());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!(addr = %bind_addr, "truetag-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
