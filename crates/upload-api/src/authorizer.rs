//! # アップロード認可
//!
//! ファイル名を命名規約カタログと照合し、一致した場合にのみ
//! 格納先キーへの署名付きアップロードURLを発行する。
//!
//! ## 応答
//! - `filename` 未指定 → 400（カタログは取得しない）
//! - 命名規約に一致しない → 400
//! - 成功 → 200（本文は署名付きURLのJSON文字列）
//! - 設定取得・パース・署名の失敗 → `UploadApiError` として伝播

use sds_types::{InvocationResponse, MetadataTags};

use crate::config::AppState;
use crate::error::UploadApiError;

/// `filename` 未指定時のメッセージ。
pub const MISSING_FILENAME_MESSAGE: &str = "Please specify a filename to upload";

/// 命名規約に一致しなかった時のメッセージ。
pub const NO_MATCHING_CONVENTION_MESSAGE: &str = "A pre-signed URL could not be generated. \
     Please ensure that the file name matches mission file naming conventions.";

/// ファイル名に対する署名付きアップロードURLを発行する。
///
/// 1. 設定ストアからカタログを取得する（呼び出しごとに取得し直す）
/// 2. 先頭から照合し、最初に一致したエントリを採用する
/// 3. 格納先キー = エントリの `path` + 元のファイル名
/// 4. `tags` をメタデータとして埋め込んだPUT URLを生成する
///
/// 一致するエントリがなければ `Ok(None)`。
pub async fn issue_upload_url(
    state: &AppState,
    filename: &str,
    tags: &MetadataTags,
) -> Result<Option<String>, UploadApiError> {
    let catalog = state.config_store.load().await?;

    let Some(found) = sds_core::find_first_match(&catalog, filename) else {
        tracing::info!(filename, "一致する命名規約が見つかりません");
        return Ok(None);
    };

    let object_key = found.destination_key(filename);
    tracing::info!(
        filename,
        object_key = %object_key,
        fields = ?found.fields,
        "命名規約に一致"
    );

    let url = state
        .signer
        .sign_put(&object_key, tags, state.upload_expiry_secs)
        .await?;

    Ok(Some(url))
}

/// 1回の関数呼び出しを処理する。
///
/// クエリパラメータは `filename` を含めてすべてそのままメタデータタグになる。
pub async fn handle_invocation(
    state: &AppState,
    params: MetadataTags,
) -> Result<InvocationResponse, UploadApiError> {
    tracing::info!(params = ?params, "アップロードURL発行リクエスト");

    let filename = match params.get("filename") {
        Some(filename) if !filename.is_empty() => filename.clone(),
        _ => return respond(400, MISSING_FILENAME_MESSAGE),
    };

    match issue_upload_url(state, &filename, &params).await? {
        Some(url) => respond(200, &url),
        None => respond(400, NO_MATCHING_CONVENTION_MESSAGE),
    }
}

fn respond(status_code: u16, message: &str) -> Result<InvocationResponse, UploadApiError> {
    InvocationResponse::json_string(status_code, message)
        .map_err(|e| UploadApiError::Internal(format!("応答のシリアライズに失敗: {e}")))
}
