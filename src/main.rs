use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

mod app;
mod config;
mod db;
mod error;
mod metrics;
mod routes;
mod state;
mod students;
mod telemetry;

use crate::{
    config::AppConfig, metrics::Metrics, state::AppState, students::MySqlStudentStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::from_env()?);
    telemetry::init_tracing(&config);

    let pool = db::connect_pool(&config.db);
    let metrics = Arc::new(Metrics::new().context("build metrics registry")?);
    let state = AppState::from_parts(
        Arc::new(MySqlStudentStore::new(pool.clone())),
        metrics,
        config.clone(),
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("parse listen address")?;

    app::serve(app::build_app(state), addr).await?;

    pool.close().await;
    tracing::info!("database pool closed");
    Ok(())
}
