//! # Upload API エラー型
//!
//! 命名規約に一致しないことはエラーではなく `Ok(None)` で表す。
//! ここに並ぶのは呼び出し側で回復できない障害のみ。

use axum::http::StatusCode;

/// Upload APIエラー型。
#[derive(Debug, thiserror::Error)]
pub enum UploadApiError {
    /// 設定ストアに到達できない、または設定オブジェクトが存在しない
    #[error("設定オブジェクトの取得に失敗: {0}")]
    ConfigRetrieval(String),
    /// 設定オブジェクトがカタログとして不正
    #[error("設定オブジェクトのパースに失敗: {0}")]
    ConfigParse(String),
    /// 署名付きURLの生成に失敗
    #[error("署名付きアップロードURLの生成に失敗: {0}")]
    Signing(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for UploadApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            UploadApiError::ConfigRetrieval(_) | UploadApiError::Signing(_) => {
                StatusCode::BAD_GATEWAY
            }
            UploadApiError::ConfigParse(_) | UploadApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        tracing::error!(error = %self, status = %status, "リクエスト処理に失敗");
        (status, self.to_string()).into_response()
    }
}
