//! # ファイルシステム 設定ストア
//!
//! ローカルのJSONファイルから命名規約カタログを読み込む。
//! 開発・テスト環境用。

use std::path::PathBuf;

use sds_types::NamingCatalog;

use super::{parse_catalog, ConfigStore};
use crate::error::UploadApiError;

/// ローカルファイルからカタログを読み込む設定ストア。
///
/// S3版と同様、呼び出しごとにファイルを読み直す。
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// 新しいFileConfigStoreを作成する。
    ///
    /// # 引数
    /// - `path`: `config.json` 形式のファイルパス
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> Result<NamingCatalog, UploadApiError> {
        let source = self.path.display().to_string();
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| UploadApiError::ConfigRetrieval(format!("{source}: {e}")))?;
        parse_catalog(&bytes, &source)
    }
}
