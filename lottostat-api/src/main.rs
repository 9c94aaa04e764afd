mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::routes::{create_router, AppState};
use lottostat_core::models::LotteryType;
use lottostat_db::db::{db_path, migrate, open_db};

#[derive(Parser)]
#[command(name = "lottostat-api", about = "Lottery statistics HTTP API")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "LOTTOSTAT_PORT")]
    port: u16,

    /// Path to the SQLite database (defaults to ./data/lottostat.db)
    #[arg(long, env = "LOTTOSTAT_DB")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(db_path);

    let conn = open_db(&path)?;
    migrate(&conn)?;
    drop(conn);

    let state = AppState::new(path);
    for lottery_type in [LotteryType::Powerball, LotteryType::MegaMillions] {
        match state.load_variant(lottery_type) {
            Ok(0) => tracing::warn!(%lottery_type, "no draws in database, endpoints will return 503"),
            Ok(n) => tracing::info!(%lottery_type, draws = n, "snapshot published"),
            Err(e) => tracing::error!(%lottery_type, error = %e, "failed to load draws"),
        }
    }

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
