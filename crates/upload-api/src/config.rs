//! # Upload API 設定・共有状態
//!
//! 環境変数からの設定読み込みとUpload APIの共有状態の定義。

use std::path::PathBuf;

use anyhow::Context;
use sds_types::UPLOAD_URL_EXPIRY_SECS;

use crate::storage::{ConfigStore, FileConfigStore, UploadSigner};

/// バケットURLから取り除くスキームプレフィックス長（`s3://`）。
const BUCKET_URL_PREFIX_LEN: usize = 5;

/// S3互換ストレージへの接続設定。
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// エンドポイントURL
    pub endpoint: String,
    /// リージョン名
    pub region: String,
    /// アクセスキー（未設定なら実行環境から解決）
    pub access_key: Option<String>,
    /// シークレットキー
    pub secret_key: Option<String>,
    /// パス形式でアクセスするか（MinIO等）
    pub path_style: bool,
}

/// 命名規約カタログの取得元。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// 設定バケットの `config.json`
    Bucket(String),
    /// ローカルファイル（開発環境用）
    File(PathBuf),
}

/// Upload APIの起動設定。
#[derive(Debug, Clone)]
pub struct Settings {
    /// カタログの取得元
    pub catalog_source: CatalogSource,
    /// アップロード先バケット名（プレフィックス除去済み）
    pub upload_bucket: String,
    /// S3接続設定
    pub s3: S3Settings,
    /// 待ち受けアドレス
    pub listen_addr: String,
}

impl Settings {
    /// 環境変数から設定を読み込む。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数ルックアップから設定を読み込む。
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let catalog_source = match lookup("SDS_CONFIG_FILE") {
            Some(path) => CatalogSource::File(PathBuf::from(path)),
            None => CatalogSource::Bucket(
                lookup("S3_CONFIG_BUCKET_NAME").context("S3_CONFIG_BUCKET_NAMEが設定されていません")?,
            ),
        };

        let upload_bucket = strip_bucket_url(
            &lookup("S3_BUCKET").context("S3_BUCKETが設定されていません")?,
        )?;

        let endpoint =
            lookup("S3_ENDPOINT").unwrap_or_else(|| "https://s3.amazonaws.com".to_string());
        let region = lookup("S3_REGION").unwrap_or_else(|| detect_region(&endpoint));
        let path_style = lookup("S3_PATH_STYLE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            catalog_source,
            upload_bucket,
            s3: S3Settings {
                endpoint,
                region,
                access_key: lookup("S3_ACCESS_KEY"),
                secret_key: lookup("S3_SECRET_KEY"),
                path_style,
            },
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }
}

/// `s3://bucket` 形式のバケットURLからバケット名を取り出す。
///
/// 先頭5文字を取り除き、末尾の `/` は許容する。
pub fn strip_bucket_url(value: &str) -> anyhow::Result<String> {
    let name = value
        .get(BUCKET_URL_PREFIX_LEN..)
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|rest| !rest.is_empty())
        .with_context(|| format!("バケットURLからバケット名を取得できません: {value:?}"))?;
    Ok(name.to_string())
}

/// AWS S3エンドポイント（s3.REGION.amazonaws.com）からリージョンを検出する。
/// 非AWSエンドポイントではus-east-1を返す。
fn detect_region(endpoint: &str) -> String {
    endpoint
        .find("s3.")
        .and_then(|start| {
            let rest = &endpoint[start + 3..];
            rest.find(".amazonaws.com").map(|end| rest[..end].to_string())
        })
        .unwrap_or_else(|| "us-east-1".to_string())
}

/// Upload APIの共有状態。
///
/// リクエスト間で可変状態は持たない。
pub struct AppState {
    /// 命名規約カタログの取得元（トレイトで抽象化）
    pub config_store: Box<dyn ConfigStore>,
    /// 署名付きURLの発行元（トレイトで抽象化）
    pub signer: Box<dyn UploadSigner>,
    /// 署名付きURLの有効期限（秒）
    pub upload_expiry_secs: u32,
}

impl AppState {
    /// 依存を差し替えて共有状態を構築する。
    pub fn new(config_store: Box<dyn ConfigStore>, signer: Box<dyn UploadSigner>) -> Self {
        Self {
            config_store,
            signer,
            upload_expiry_secs: UPLOAD_URL_EXPIRY_SECS,
        }
    }

    /// 起動設定から共有状態を構築する。
    #[cfg(feature = "vendor-aws")]
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        use crate::storage::{S3ConfigStore, S3UploadSigner};

        let config_store: Box<dyn ConfigStore> = match &settings.catalog_source {
            CatalogSource::Bucket(bucket) => {
                Box::new(S3ConfigStore::from_settings(&settings.s3, bucket)?)
            }
            CatalogSource::File(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "ローカルファイルからカタログを読み込みます（開発環境用）"
                );
                Box::new(FileConfigStore::new(path.clone()))
            }
        };
        let signer = S3UploadSigner::from_settings(&settings.s3, &settings.upload_bucket)?;

        Ok(Self::new(config_store, Box::new(signer)))
    }

    /// 起動設定から共有状態を構築する。
    #[cfg(not(feature = "vendor-aws"))]
    pub fn from_settings(_settings: &Settings) -> anyhow::Result<Self> {
        anyhow::bail!("署名付きURLの発行にはvendor-aws featureが必要です")
    }
}
