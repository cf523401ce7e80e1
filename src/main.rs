use mediagrab::{ApiError, AppState, Config, router};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "mediagrab=info,tower_http=info".to_string()),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("Server error: {}", error.message);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ApiError> {
    let config = Config::from_env().map_err(ApiError::internal)?;

    if config.api_key.is_none() {
        warn!("DOWNLOADER_API_KEY is not configured. /api/download will answer 500 until it is set.");
    }
    if !config.public_dir.is_dir() {
        warn!(
            "Static asset directory {:?} does not exist. Only the API routes will respond.",
            config.public_dir
        );
    }

    let state = AppState::new(&config)?;
    let app = router(state, &config);

    let listener = TcpListener::bind(&config.bind_addr).await.map_err(|error| {
        ApiError::internal(format!("Could not bind {}: {error}", config.bind_addr))
    })?;

    info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|error| ApiError::internal(format!("HTTP server error: {error}")))
}
