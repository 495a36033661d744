mod auth;
mod codes;
mod config;
mod db;
mod error;
mod layout;
mod logo;
mod pdf;
mod qr;
mod routes;
mod service;
mod state;
mod templates;
mod validation;

use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zertifikat=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    if pdf::load_fonts(config.font_dir.as_deref()).is_err() {
        tracing::warn!("No fonts found; PDF downloads will fail until FONT_DIR is set");
    }

    let store = Arc::new(db::PgCertificateStore::new(pool));
    let state = Arc::new(state::AppState::new(config.clone(), store));
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Zertifikat listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
