//! # POST /invoke
//!
//! HTTPトリガー関数の呼び出しイベントを受け、`{statusCode, body}` を返す。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use sds_types::{InvocationRequest, InvocationResponse};

use crate::authorizer::handle_invocation;
use crate::config::AppState;
use crate::error::UploadApiError;

/// POST /invoke — 関数呼び出しイベントの処理。
///
/// `queryStringParameters` が無いイベントは空のパラメータとして扱う。
pub async fn handle_invoke(
    State(state): State<Arc<AppState>>,
    Json(event): Json<InvocationRequest>,
) -> Result<Json<InvocationResponse>, UploadApiError> {
    let params = event.query_string_parameters.unwrap_or_default();
    let response = handle_invocation(&state, params).await?;
    Ok(Json(response))
}
