//! # Upload APIエンドポイント
//!
//! ## API エンドポイント
//! - `GET /upload?filename=...` — 署名付きアップロードURL発行
//! - `POST /invoke` — 関数呼び出しイベント形式での同処理

pub mod invoke;
pub mod upload;

pub use invoke::handle_invoke;
pub use upload::handle_upload;

use std::sync::Arc;

use crate::config::AppState;

/// Upload APIのルーターを構築する。
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/upload", axum::routing::get(handle_upload))
        .route("/invoke", axum::routing::post(handle_invoke))
        .with_state(state)
}
