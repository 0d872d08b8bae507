pub mod config;
pub mod db;
pub mod err;
pub mod filter;
pub mod models;
pub mod routes;
pub mod store;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::config::Config;
use crate::err::Error;

pub type Payload<T> = axum::response::Result<Json<T>, Error>;
pub type Created<T> = axum::response::Result<(StatusCode, Json<T>), Error>;

pub fn proceeds<V>(value: V) -> Payload<V> where V: Serialize {
    Ok(Json(value))
}

pub fn created<V>(value: V) -> Created<V> where V: Serialize {
    Ok((StatusCode::CREATED, Json(value)))
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let pg = db::connect(&config.database_url, config.max_connections).await?;
    db::prepare_schema(&pg).await?;

    let app = routes::router(pg, config.allowed_origins);

    log::info!("Starting student scores HTTP server on http://{}", config.bind_addr);
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
