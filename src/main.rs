use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use image_request_intake::{config::AppConfig, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_request_intake=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let service = config.intake_service()?;

    let local_storage = config.local_storage_dir();
    if let Some(dir) = local_storage {
        tokio::fs::create_dir_all(dir).await?;
        tracing::info!(dir = %dir.display(), "serving local storage");
    }
    let router = routes::router(
        service,
        config.max_upload_bytes,
        local_storage.map(|dir| dir.as_path()),
    );
    match &config.webhook_url {
        Some(url) => tracing::info!(%url, "webhook notifications enabled"),
        None => tracing::info!("WEBHOOK_URL not set, webhook notifications disabled"),
    }

    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(
        "Image request intake listening on http://{}{}",
        bind_address,
        routes::GENERATE_IMAGE_ROUTE
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
