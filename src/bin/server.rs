//! Server binary: settings from the environment, one-time schema
//! introspection, then the axum router. An unreachable database or failed
//! introspection is fatal.

use axum::Router;
use sqlgate::{api_routes, common_routes, AppState, Catalog, Settings};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sqlgate=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(db = %settings.masked(), schema = %settings.schema, "connecting");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(settings.connect_options()?)
        .await?;

    let catalog = Catalog::introspect(&pool, &settings.schema).await?;
    let state = AppState::new(pool, catalog);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(common_routes())
        .nest("/api/v1", api_routes(state))
        .layer(cors);

    let listener = TcpListener::bind(&settings.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
