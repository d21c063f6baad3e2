//! # 外部ストレージ
//!
//! 設定ストア（命名規約カタログの取得）とオブジェクトストレージ
//! （署名付きアップロードURLの発行）の抽象インターフェース。
//!
//! ## 実装
//! - `S3ConfigStore` / `S3UploadSigner`: S3互換ストレージ（`s3` サブモジュール）
//! - `FileConfigStore`: ローカルファイルからカタログを読み込む（開発・テスト用）

pub mod file;
#[cfg(feature = "vendor-aws")]
pub mod s3;

pub use file::FileConfigStore;
#[cfg(feature = "vendor-aws")]
pub use self::s3::{S3ConfigStore, S3UploadSigner};

use sds_types::{MetadataTags, NamingCatalog};

use crate::error::UploadApiError;

/// 命名規約カタログを提供する設定ストア。
///
/// キャッシュは持たない。呼び出しごとに取得し直す。
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// カタログを取得してパースする。
    ///
    /// 取得失敗は `ConfigRetrieval`、内容の不正は `ConfigParse`。
    async fn load(&self) -> Result<NamingCatalog, UploadApiError>;
}

/// 書き込み用の署名付きURLを発行するオブジェクトストレージ。
#[async_trait::async_trait]
pub trait UploadSigner: Send + Sync {
    /// `object_key` へのPUTを許可する署名付きURLを生成する。
    ///
    /// `metadata` はオブジェクトメタデータとしてURLに埋め込まれる。
    async fn sign_put(
        &self,
        object_key: &str,
        metadata: &MetadataTags,
        expiry_secs: u32,
    ) -> Result<String, UploadApiError>;
}

/// 取得した設定オブジェクトをカタログとしてパースする。
pub(crate) fn parse_catalog(bytes: &[u8], source: &str) -> Result<NamingCatalog, UploadApiError> {
    NamingCatalog::from_json(bytes)
        .map_err(|e| UploadApiError::ConfigParse(format!("{source}: {e}")))
}
