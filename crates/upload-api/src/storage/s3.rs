//! # S3互換ストレージ実装
//!
//! AWS S3, MinIO 等のS3互換APIを使用する設定ストアと署名付きURL発行。

use std::collections::HashMap;

use sds_types::{MetadataTags, NamingCatalog, CATALOG_OBJECT_KEY};

use super::{parse_catalog, ConfigStore, UploadSigner};
use crate::config::S3Settings;
use crate::error::UploadApiError;

/// オブジェクトメタデータを表すクエリパラメータのプレフィックス。
const METADATA_QUERY_PREFIX: &str = "x-amz-meta-";

/// 接続設定からS3互換バケットを初期化する。
///
/// アクセスキーが未設定の場合は環境変数・プロファイル・インスタンスロールから
/// 認証情報を解決する。
pub(crate) fn init_bucket(settings: &S3Settings, bucket_name: &str) -> anyhow::Result<s3::Bucket> {
    let region = s3::Region::Custom {
        region: settings.region.clone(),
        endpoint: settings.endpoint.clone(),
    };

    let credentials = match (&settings.access_key, &settings.secret_key) {
        (Some(access_key), Some(secret_key)) => s3::creds::Credentials::new(
            Some(access_key.as_str()),
            Some(secret_key.as_str()),
            None,
            None,
            None,
        )?,
        _ => s3::creds::Credentials::default()?,
    };

    let bucket = s3::Bucket::new(bucket_name, region, credentials)?;
    let bucket = if settings.path_style {
        bucket.with_path_style()
    } else {
        bucket
    };

    Ok(*bucket)
}

/// メタデータタグを署名対象のクエリパラメータに変換する。
///
/// 署名付きPUTではメタデータを `x-amz-meta-<name>` クエリとして渡す。
/// キー・値は加工しない。
fn metadata_query_params(metadata: &MetadataTags) -> HashMap<String, String> {
    metadata
        .iter()
        .map(|(key, value)| (format!("{METADATA_QUERY_PREFIX}{key}"), value.clone()))
        .collect()
}

/// 設定バケットの `config.json` からカタログを読み込む設定ストア。
pub struct S3ConfigStore {
    bucket: s3::Bucket,
}

impl S3ConfigStore {
    /// 設定バケットからS3ConfigStoreを構築する。
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 接続設定とバケット名から構築する。
    pub fn from_settings(settings: &S3Settings, bucket_name: &str) -> anyhow::Result<Self> {
        Ok(Self::new(init_bucket(settings, bucket_name)?))
    }
}

#[async_trait::async_trait]
impl ConfigStore for S3ConfigStore {
    async fn load(&self) -> Result<NamingCatalog, UploadApiError> {
        let source = format!("s3://{}/{CATALOG_OBJECT_KEY}", self.bucket.name());

        let response = self
            .bucket
            .get_object(CATALOG_OBJECT_KEY)
            .await
            .map_err(|e| UploadApiError::ConfigRetrieval(format!("{source}: {e}")))?;

        let status = response.status_code();
        if status != 200 {
            return Err(UploadApiError::ConfigRetrieval(format!(
                "{source}: HTTP {status}"
            )));
        }

        parse_catalog(response.bytes(), &source)
    }
}

/// アップロード先バケットへの署名付きPUT URLを発行する。
pub struct S3UploadSigner {
    bucket: s3::Bucket,
}

impl S3UploadSigner {
    /// アップロード先バケットからS3UploadSignerを構築する。
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 接続設定とバケット名から構築する。
    pub fn from_settings(settings: &S3Settings, bucket_name: &str) -> anyhow::Result<Self> {
        Ok(Self::new(init_bucket(settings, bucket_name)?))
    }
}

#[async_trait::async_trait]
impl UploadSigner for S3UploadSigner {
    async fn sign_put(
        &self,
        object_key: &str,
        metadata: &MetadataTags,
        expiry_secs: u32,
    ) -> Result<String, UploadApiError> {
        let queries = (!metadata.is_empty()).then(|| metadata_query_params(metadata));

        self.bucket
            .presign_put(object_key, expiry_secs, None, queries)
            .await
            .map_err(|e| UploadApiError::Signing(format!("{object_key}: {e}")))
    }
}
