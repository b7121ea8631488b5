use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    metrics::{metrics_handler, track_duration},
    routes::health::health_routes,
    state::AppState,
    students,
    telemetry::{LogResponse, RequestSpan, REQUEST_ID_HEADER},
};

/// `/metrics` is mounted outside the logged and measured router, so it gets
/// neither a request id, a log record nor a histogram sample.
pub fn build_app(state: AppState) -> Router {
    let measured = Router::new()
        .merge(health_routes())
        .merge(students::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), track_duration))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(RequestSpan::new(&state.config.service_name))
                        .on_request(())
                        .on_response(LogResponse)
                        .on_failure(()),
                )
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        );

    Router::new()
        .route("/metrics", get(metrics_handler))
        .merge(measured)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}
