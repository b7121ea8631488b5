use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HealthResponse {
    Up { ok: bool, db: bool },
    Down { ok: bool, error: String },
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.students.ping().await {
        Ok(db) => (StatusCode::OK, Json(HealthResponse::Up { ok: true, db })),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse::Down {
                    ok: false,
                    error: e.to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serialization() {
        let up = serde_json::to_string(&HealthResponse::Up { ok: true, db: true }).unwrap();
        assert_eq!(up, r#"{"ok":true,"db":true}"#);

        let down = serde_json::to_value(HealthResponse::Down {
            ok: false,
            error: "pool timed out".into(),
        })
        .unwrap();
        assert_eq!(down["ok"], false);
        assert_eq!(down["error"], "pool timed out");
    }
}
