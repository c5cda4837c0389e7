//! HTTP surface for the PBX terminal driver
//!
//! - `POST /v3/{pbx_name}` JSON in, JSON out
//! - `POST /v2/{pbx_name}` legacy XML in a `request` form field, XML out
//! - `GET /healthz` liveness probe that runs a cheap OSSI command
//! - `GET /ready` readiness probe
//!
//! The terminal is a blocking, single-flight resource; handlers hop onto the
//! blocking pool and hold the terminal mutex for the whole command.

pub mod health;
pub mod v2;
pub mod v3;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

use crate::log_error;
use crate::pbx::{PbxResponse, Terminal};

#[derive(Clone)]
pub struct AppState {
    pub terminal: Arc<Mutex<Terminal>>,
    /// Identity matched against the `{pbx_name}` path segment.
    pub pbx_name: String,
}

/// Build the service router, mounted under `application_root`.
pub fn build_router(state: AppState, application_root: &str) -> Router {
    let api = Router::new()
        .route("/ready", get(health::readiness))
        .route("/healthz", get(health::liveness))
        .route("/v2/{pbx_name}", post(v2::legacy_xml_post))
        .route("/v3/{pbx_name}", post(v3::pbx_command))
        .with_state(state);

    let prefix = application_root.trim_end_matches('/');
    if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    }
}

/// Run one PBX command on the blocking pool, holding the terminal for the
/// duration. Connection-establishment failures map to 500; everything else
/// is already folded into the response.
pub(crate) async fn run_pbx_command(
    state: &AppState,
    termtype: String,
    command: String,
    fields: Option<IndexMap<String, String>>,
    debug: bool,
) -> Result<PbxResponse, StatusCode> {
    let terminal = state.terminal.clone();
    let result = tokio::task::spawn_blocking(move || {
        // A poisoned lock means a previous command panicked; the session is
        // suspect either way and ensure_mode will reconnect it.
        let mut terminal = terminal.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        terminal.send_pbx_command(&termtype, &command, fields.as_ref(), debug)
    })
    .await
    .map_err(|err| {
        log_error!("PBX command task failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    result.map_err(|err| {
        log_error!("{}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
