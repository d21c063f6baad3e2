//! # GET /upload
//!
//! クエリパラメータで受けたファイル名に対して署名付きアップロードURLを発行する。

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use sds_types::MetadataTags;

use crate::authorizer::handle_invocation;
use crate::config::AppState;
use crate::error::UploadApiError;

/// GET /upload — 署名付きURL発行。
///
/// 本文はJSONエンコードされた文字列（URLまたはメッセージ）。
pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetadataTags>,
) -> Result<Response, UploadApiError> {
    let result = handle_invocation(&state, params).await?;

    let status = StatusCode::from_u16(result.status_code)
        .map_err(|e| UploadApiError::Internal(format!("不正なステータスコード: {e}")))?;

    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        result.body,
    )
        .into_response())
}
