use std::sync::Arc;

use tower_http::cors::CorsLayer;

use pokebot::catalog::Catalog;
use pokebot::config::Config;
use pokebot::db::Database;
use pokebot::dice::ThreadDice;
use pokebot::game::Game;
use pokebot::{api, metrics};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path).unwrap_or_else(|e| {
            tracing::error!("Failed to load catalog from {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => Catalog::default(),
    };
    tracing::info!(
        starters = catalog.starters.len(),
        wild = catalog.wild.len(),
        "Catalog loaded"
    );

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize database");

    let game = Game::new(Arc::new(db), catalog, Arc::new(ThreadDice))
        .with_leaderboard_limit(config.leaderboard_limit);

    let app = api::router(Arc::new(game)).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("Pokebot backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
