mod config;
mod guard;
mod routes;
mod services;
mod state;
mod upstream;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;

    let client = upstream::client::ApiClient::new(&config.api_url, config.timeouts).expect("upstream client init failed");
    tracing::info!(api_url = %client.base_url(), "upstream configured");
    let state = state::AppState::new(config, Arc::new(client));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "fasttodo listening");
    axum::serve(listener, app).await.expect("server failed");
}
