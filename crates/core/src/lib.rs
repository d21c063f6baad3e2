//! # SDS Core
//!
//! ファイル名の命名規約照合を実装する。I/Oは持たない。
//!
//! ## 処理フロー
//! 1. ファイル名をトークン化する（`_` を `.` に置換し `.` で分割）
//! 2. カタログのエントリを先頭から順に照合する
//! 3. 最初に一致したエントリの `path` とファイル名から格納先キーを導出する

use sds_types::{CatalogEntry, FileMatch, FilePattern, NamingCatalog};

/// カタログ照合の結果。一致したエントリと抽出したフィールド値を持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch<'a> {
    /// 一致したエントリ
    pub entry: &'a CatalogEntry,
    /// パターンのフィールド名から抽出したトークンへの対応
    pub fields: FileMatch,
}

impl CatalogMatch<'_> {
    /// 一致したエントリの格納先キーを導出する。
    pub fn destination_key(&self, filename: &str) -> String {
        destination_key(self.entry, filename)
    }
}

/// ファイル名をトークン列に分解する。
///
/// 空トークンも位置を占めるため除去しない（`"a..b"` は3トークン）。
pub fn tokenize(filename: &str) -> Vec<String> {
    filename
        .replace('_', ".")
        .split('.')
        .map(str::to_string)
        .collect()
}

/// 1つのパターンとファイル名を照合する。
///
/// トークン数がフィールド数と異なる場合は部分照合を行わず `None`。
/// リテラルの不一致が見つかった時点で打ち切る。
pub fn match_pattern(pattern: &FilePattern, filename: &str) -> Option<FileMatch> {
    let tokens = tokenize(filename);
    if tokens.len() != pattern.len() {
        return None;
    }

    let mut fields = Vec::with_capacity(tokens.len());
    for ((name, matcher), token) in pattern.fields().zip(tokens) {
        if !matcher.accepts(&token) {
            return None;
        }
        fields.push((name.to_string(), token));
    }

    Some(FileMatch::from_fields(fields))
}

/// カタログを先頭から照合し、最初に一致したエントリを返す。
///
/// 一致なしは正常系（未知のファイル名）であり `None` を返す。
pub fn find_first_match<'a>(catalog: &'a NamingCatalog, filename: &str) -> Option<CatalogMatch<'a>> {
    catalog.iter().find_map(|entry| {
        match_pattern(&entry.pattern, filename).map(|fields| CatalogMatch { entry, fields })
    })
}

/// 格納先キー = エントリの `path` + 元のファイル名（区切り文字は補わない）。
pub fn destination_key(entry: &CatalogEntry, filename: &str) -> String {
    format!("{}{}", entry.path, filename)
}
