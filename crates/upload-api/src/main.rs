//! # SDS Upload API
//!
//! ミッションのファイル命名規約に沿ったファイルに対してのみ、
//! データバケットへの署名付きアップロードURLを発行する。
//!
//! ## 役割
//! - 設定バケットから命名規約カタログ（`config.json`）を取得
//! - ファイル名をカタログと照合し、格納先キーを決定
//! - クエリパラメータをメタデータとして埋め込んだ署名付きPUT URLを発行
//!
//! ## API エンドポイント
//! - `GET /upload` — 署名付きURL発行
//! - `POST /invoke` — 関数呼び出しイベント形式での署名付きURL発行

mod authorizer;
mod config;
mod endpoints;
mod error;
mod storage;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{AppState, CatalogSource, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    match &settings.catalog_source {
        CatalogSource::Bucket(bucket) => {
            tracing::info!(config_bucket = %bucket, "設定バケットからカタログを取得します")
        }
        CatalogSource::File(path) => {
            tracing::info!(config_file = %path.display(), "ローカルファイルからカタログを取得します")
        }
    }
    tracing::info!(
        upload_bucket = %settings.upload_bucket,
        s3_endpoint = %settings.s3.endpoint,
        s3_region = %settings.s3.region,
        "アップロード先バケットを設定"
    );

    let state = Arc::new(AppState::from_settings(&settings)?);
    let app = endpoints::router(state);

    tracing::info!("Upload APIを {} で起動します", settings.listen_addr);

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
