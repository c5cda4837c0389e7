//! v3 JSON endpoint

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use indexmap::IndexMap;
use serde::Deserialize;

use super::{AppState, run_pbx_command};
use crate::{log_debug, log_error};

#[derive(Debug, Deserialize)]
pub(crate) struct V3Request {
    termtype: String,
    command: String,
    #[serde(default)]
    fields: Option<IndexMap<String, String>>,
    #[serde(default)]
    debug: bool,
}

/// `POST /v3/{pbx_name}` with `{termtype, command, fields?, debug?}`.
///
/// The body is parsed by hand so a malformed or incomplete request is a 400
/// rather than whatever the extractor would pick.
pub async fn pbx_command(
    State(state): State<AppState>,
    Path(pbx_name): Path<String>,
    body: String,
) -> Result<Json<crate::pbx::PbxResponse>, (StatusCode, String)> {
    if pbx_name != state.pbx_name {
        log_error!("connected to the wrong PBX: {} != {}", pbx_name, state.pbx_name);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Wrong PBX".to_string()));
    }

    log_debug!("{}", body);
    let request: V3Request = serde_json::from_str(&body).map_err(|err| {
        log_debug!("bad v3 request: {}", err);
        (StatusCode::BAD_REQUEST, "Bad request".to_string())
    })?;

    let response = run_pbx_command(&state, request.termtype, request.command, request.fields, request.debug)
        .await
        .map_err(|status| (status, "PBX command failed".to_string()))?;

    Ok(Json(response))
}

#[cfg(test)]
#[path = "../test/http/v3.rs"]
mod tests;
