use sitelytics::config::Config;
use sitelytics::ingest::geoip::GeoResolver;
use sitelytics::ingest::handler::AppState;
use sitelytics::server;
use sitelytics::storage::file_store::FileStore;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitelytics=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(std::path::Path::new));

    tracing::info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir.display(),
        strategy = ?config.match_strategy,
        "Starting Sitelytics"
    );

    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");

    let state = Arc::new(AppState {
        store: FileStore::new(&config.data_dir),
        geo: GeoResolver::open(config.geoip_db_path.as_deref()),
        match_strategy: config.match_strategy,
        utc_offset: config.utc_offset(),
    });

    let app = server::build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, app).await.expect("Server error");
}
