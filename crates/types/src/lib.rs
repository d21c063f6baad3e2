//! # SDS 共有型定義
//!
//! アップロード認可で扱うデータ構造をRust構造体として提供する。
//!
//! ## カタログ形式
//! 設定ストアの `config.json` はエントリのJSON配列。
//! 各エントリは格納先プレフィックス `path` と、フィールド名から
//! リテラル文字列またはワイルドカード `"*"` への対応 `pattern` を持つ。
//!
//! ```json
//! [
//!   {
//!     "path": "imap/mag/l0/",
//!     "pattern": {
//!       "mission": "imap",
//!       "instrument": "mag",
//!       "level": "l0",
//!       "date": "*",
//!       "extension": "pkts"
//!     }
//!   }
//! ]
//! ```
//!
//! `pattern` のフィールド順はファイル名のトークン順に対応するため、
//! JSONの記述順をそのまま保持する。

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// ワイルドカードを表すパターン値。
pub const WILDCARD: &str = "*";

/// カタログを格納する設定オブジェクトの固定キー。
pub const CATALOG_OBJECT_KEY: &str = "config.json";

/// 署名付きアップロードURLの有効期限（秒）。
pub const UPLOAD_URL_EXPIRY_SECS: u32 = 3600;

/// アップロードに付与するメタデータタグ。
/// 内容の検証は行わない。
pub type MetadataTags = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// パターン
// ---------------------------------------------------------------------------

/// パターンの1フィールドが受け付けるトークン。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatcher {
    /// 任意のトークンを受け付ける（`"*"`）
    Wildcard,
    /// 完全一致するトークンのみ受け付ける（大文字小文字を区別）
    Literal(String),
}

impl FieldMatcher {
    /// トークンがこのフィールドに適合するか判定する。
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            FieldMatcher::Wildcard => true,
            FieldMatcher::Literal(expected) => expected == token,
        }
    }
}

impl From<&str> for FieldMatcher {
    fn from(value: &str) -> Self {
        if value == WILDCARD {
            FieldMatcher::Wildcard
        } else {
            FieldMatcher::Literal(value.to_string())
        }
    }
}

impl Serialize for FieldMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldMatcher::Wildcard => serializer.serialize_str(WILDCARD),
            FieldMatcher::Literal(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for FieldMatcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(FieldMatcher::from(value.as_str()))
    }
}

/// ファイル名のトークン構造を定義する順序付きパターン。
///
/// フィールドの並びがトークン位置に対応する。
/// キーで引く用途はないため、`Vec` で宣言順を保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePattern {
    fields: Vec<(String, FieldMatcher)>,
}

impl FilePattern {
    /// 空のパターンを作成する。
    pub fn new() -> Self {
        Self::default()
    }

    /// フィールドを末尾に追加する（ビルダー形式）。
    pub fn field(mut self, name: impl Into<String>, matcher: impl Into<FieldMatcher>) -> Self {
        self.fields.push((name.into(), matcher.into()));
        self
    }

    /// フィールド数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// フィールドを持たないか
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 宣言順にフィールドを走査する。
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldMatcher)> {
        self.fields.iter().map(|(name, m)| (name.as_str(), m))
    }
}

impl Serialize for FilePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, matcher) in &self.fields {
            map.serialize_entry(name, matcher)?;
        }
        map.end()
    }
}

struct FilePatternVisitor;

impl<'de> Visitor<'de> for FilePatternVisitor {
    type Value = FilePattern;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("フィールド名から文字列へのオブジェクト")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FilePattern, A::Error> {
        let mut fields: Vec<(String, FieldMatcher)> =
            Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, matcher)) = access.next_entry::<String, FieldMatcher>()? {
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(format!(
                    "パターンのフィールド名が重複しています: {name}"
                )));
            }
            fields.push((name, matcher));
        }
        Ok(FilePattern { fields })
    }
}

impl<'de> Deserialize<'de> for FilePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FilePatternVisitor)
    }
}

// ---------------------------------------------------------------------------
// カタログ
// ---------------------------------------------------------------------------

/// 命名規約カタログの1エントリ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 格納先キーのプレフィックス
    pub path: String,
    /// ファイル名のトークン構造
    pub pattern: FilePattern,
}

/// 命名規約カタログ。
///
/// エントリの順序が優先順位を決める（先に一致したものが採用される）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamingCatalog {
    /// 優先順のエントリ一覧
    pub entries: Vec<CatalogEntry>,
}

impl NamingCatalog {
    /// エントリ一覧からカタログを構築する。
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// `config.json` の内容をパースする。
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// エントリを持たないか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 優先順にエントリを走査する。
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a NamingCatalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// 照合結果
// ---------------------------------------------------------------------------

/// パターン照合の結果。フィールド名から抽出したトークンへの対応。
///
/// 全フィールドが一致した場合にのみ生成される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMatch {
    fields: Vec<(String, String)>,
}

impl FileMatch {
    /// 照合済みのフィールド列から構築する。
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// フィールド名に対応するトークンを返す。
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, token)| token.as_str())
    }

    /// フィールド数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// フィールドを持たないか
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// パターンの宣言順にフィールドを走査する。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }
}

impl Serialize for FileMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, token) in &self.fields {
            map.serialize_entry(name, token)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// 関数呼び出し境界
// ---------------------------------------------------------------------------

/// HTTPトリガーの関数呼び出しイベント。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// クエリパラメータ。未指定の場合は空として扱う。
    #[serde(rename = "queryStringParameters", default)]
    pub query_string_parameters: Option<MetadataTags>,
}

/// 関数呼び出しの応答。`body` はJSONエンコード済み文字列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// HTTPステータスコード
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSONエンコードされた本文（URLまたはメッセージ）
    pub body: String,
}

impl InvocationResponse {
    /// 文字列をJSONエンコードして本文とする応答を作成する。
    pub fn json_string(status_code: u16, message: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code,
            body: serde_json::to_string(message)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// JSONの記述順がパターンのフィールド順として保持されることを確認
    #[test]
    fn test_pattern_preserves_document_order() {
        let pattern: FilePattern = serde_json::from_str(
            r#"{"mission": "imap", "instrument": "*", "level": "l0", "date": "*"}"#,
        )
        .unwrap();

        let names: Vec<&str> = pattern.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["mission", "instrument", "level", "date"]);
        assert_eq!(pattern.len(), 4);
    }

    #[test]
    fn test_field_matcher_wildcard_and_literal() {
        let pattern: FilePattern =
            serde_json::from_str(r#"{"mission": "imap", "level": "*"}"#).unwrap();
        let matchers: Vec<&FieldMatcher> = pattern.fields().map(|(_, m)| m).collect();

        assert_eq!(matchers[0], &FieldMatcher::Literal("imap".to_string()));
        assert_eq!(matchers[1], &FieldMatcher::Wildcard);
        assert!(matchers[1].accepts("anything"));
        assert!(matchers[0].accepts("imap"));
        assert!(!matchers[0].accepts("IMAP"));
    }

    /// 重複したフィールド名はパースエラーになることを確認
    #[test]
    fn test_pattern_rejects_duplicate_field() {
        let result: Result<FilePattern, _> =
            serde_json::from_str(r#"{"mission": "imap", "mission": "*"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_pattern_rejects_non_string_value() {
        let result: Result<FilePattern, _> = serde_json::from_str(r#"{"version": 1}"#);
        assert!(result.is_err());
    }

    /// config.json 形式のカタログをパースできることを確認
    #[test]
    fn test_catalog_from_json() {
        let json = br#"[
            {"path": "imap/mag/", "pattern": {"mission": "imap", "instrument": "mag", "ext": "*"}},
            {"path": "imap/other/", "pattern": {"mission": "imap", "rest": "*"}}
        ]"#;

        let catalog = NamingCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries[0].path, "imap/mag/");
        assert_eq!(catalog.entries[1].pattern.len(), 2);
    }

    #[test]
    fn test_catalog_rejects_malformed_content() {
        assert!(NamingCatalog::from_json(b"not json").is_err());
        assert!(NamingCatalog::from_json(br#"{"path": "x/"}"#).is_err());
        assert!(NamingCatalog::from_json(br#"[{"pattern": {}}]"#).is_err());
    }

    /// シリアライズ後もフィールド順が変わらないことを確認
    #[test]
    fn test_pattern_serializes_in_declared_order() {
        let pattern = FilePattern::new()
            .field("z", "zeta")
            .field("a", WILDCARD);
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, r#"{"z":"zeta","a":"*"}"#);
    }

    #[test]
    fn test_invocation_request_without_parameters() {
        let req: InvocationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query_string_parameters.is_none());

        let req: InvocationRequest = serde_json::from_str(
            r#"{"queryStringParameters": {"filename": "a.b", "mission": "imap"}}"#,
        )
        .unwrap();
        let params = req.query_string_parameters.unwrap();
        assert_eq!(params.get("filename").map(String::as_str), Some("a.b"));
        assert_eq!(params.len(), 2);
    }

    /// 応答本文がJSON文字列としてエンコードされることを確認
    #[test]
    fn test_invocation_response_body_is_json_string() {
        let resp = InvocationResponse::json_string(200, "https://example.com/u?x=1").unwrap();
        assert_eq!(resp.body, r#""https://example.com/u?x=1""#);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["statusCode"], 200);
    }
}
