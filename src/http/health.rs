//! Probe endpoints

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use indexmap::IndexMap;

use super::AppState;
use crate::log_error;
use crate::pbx::OssiResponse;

/// Report that the worker is up and able to take a request.
pub async fn readiness() -> &'static str {
    "OK"
}

/// Check that the PBX session still answers: ask for the time field of
/// `display time`, the cheapest command the SAT offers.
pub async fn liveness(State(state): State<AppState>) -> Result<Json<OssiResponse>, (StatusCode, String)> {
    let terminal = state.terminal.clone();
    let response = tokio::task::spawn_blocking(move || {
        let mut terminal = terminal.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut fields = IndexMap::new();
        fields.insert("0007ff00".to_string(), String::new());
        terminal.ossi_command("display time", Some(&fields), false)
    })
    .await
    .map_err(|err| {
        log_error!("health check task failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Health check failed".to_string())
    })?
    .map_err(|err| {
        log_error!("{}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Health check failed".to_string())
    })?;

    Ok(Json(response))
}
