//! # テスト用共通ヘルパー
//!
//! 設定ストアと署名器のモック。呼び出し回数と引数を記録する。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sds_types::{CatalogEntry, FilePattern, MetadataTags, NamingCatalog, WILDCARD};

use crate::config::AppState;
use crate::error::UploadApiError;
use crate::storage::{parse_catalog, ConfigStore, UploadSigner};

/// モック設定ストアの応答内容。
#[derive(Clone)]
pub enum CatalogOutcome {
    /// 指定のカタログを返す
    Catalog(NamingCatalog),
    /// 取得失敗
    Unreachable,
    /// 不正な内容
    Malformed,
}

/// 呼び出し回数を記録するモック設定ストア。
pub struct MockConfigStore {
    outcome: CatalogOutcome,
    calls: Arc<AtomicUsize>,
}

impl MockConfigStore {
    /// モックと呼び出しカウンタを作成する。
    pub fn new(outcome: CatalogOutcome) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                outcome,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait::async_trait]
impl ConfigStore for MockConfigStore {
    async fn load(&self) -> Result<NamingCatalog, UploadApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            CatalogOutcome::Catalog(catalog) => Ok(catalog.clone()),
            CatalogOutcome::Unreachable => Err(UploadApiError::ConfigRetrieval(
                "mock-config/config.json: connection refused".to_string(),
            )),
            CatalogOutcome::Malformed => parse_catalog(b"{ not json", "mock-config/config.json"),
        }
    }
}

/// 署名器に渡された引数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPut {
    pub object_key: String,
    pub metadata: MetadataTags,
    pub expiry_secs: u32,
}

/// 引数を記録し、ダミーの署名付きURLを返すモック署名器。
pub struct MockSigner {
    fail: bool,
    calls: Arc<Mutex<Vec<SignedPut>>>,
}

impl MockSigner {
    /// モックと記録領域を作成する。
    pub fn new() -> (Self, Arc<Mutex<Vec<SignedPut>>>) {
        Self::with_failure(false)
    }

    /// 常に署名に失敗するモックを作成する。
    pub fn failing() -> (Self, Arc<Mutex<Vec<SignedPut>>>) {
        Self::with_failure(true)
    }

    fn with_failure(fail: bool) -> (Self, Arc<Mutex<Vec<SignedPut>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                fail,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait::async_trait]
impl UploadSigner for MockSigner {
    async fn sign_put(
        &self,
        object_key: &str,
        metadata: &MetadataTags,
        expiry_secs: u32,
    ) -> Result<String, UploadApiError> {
        self.calls.lock().unwrap().push(SignedPut {
            object_key: object_key.to_string(),
            metadata: metadata.clone(),
            expiry_secs,
        });
        if self.fail {
            return Err(UploadApiError::Signing(format!("{object_key}: access denied")));
        }
        Ok(format!(
            "http://mock-storage/sds-data/{object_key}?X-Amz-Expires={expiry_secs}&sig=test"
        ))
    }
}

/// IMAPの命名規約を模したカタログ。
pub fn imap_catalog() -> NamingCatalog {
    NamingCatalog::new(vec![
        CatalogEntry {
            path: "imap/l0/".to_string(),
            pattern: FilePattern::new()
                .field("mission", "imap")
                .field("instrument", WILDCARD)
                .field("level", "l0")
                .field("date", WILDCARD)
                .field("extension", "pkts"),
        },
        CatalogEntry {
            path: "imap/cdf/".to_string(),
            pattern: FilePattern::new()
                .field("mission", "imap")
                .field("instrument", WILDCARD)
                .field("level", WILDCARD)
                .field("date", WILDCARD)
                .field("version", WILDCARD)
                .field("extension", "cdf"),
        },
    ])
}

/// モックを組み込んだ共有状態を構築する。
pub fn test_state(config_store: MockConfigStore, signer: MockSigner) -> Arc<AppState> {
    Arc::new(AppState::new(Box::new(config_store), Box::new(signer)))
}

/// クエリパラメータを組み立てる。
pub fn params(pairs: &[(&str, &str)]) -> MetadataTags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
