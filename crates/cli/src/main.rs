//! # SDS CLI
//!
//! 命名規約カタログ（`config.json`）をローカルで確認するためのツール。
//!
//! ## サブコマンド
//! - `match` — ファイル名をカタログと照合し、格納先キーと抽出値を表示
//! - `validate` — カタログをパースしてエントリ一覧を表示

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sds_types::{FileMatch, MetadataTags, NamingCatalog};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "sds-cli", about = "SDS naming convention catalog tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// ファイル名をカタログと照合する
    Match {
        /// カタログファイル（config.json形式）
        #[arg(long)]
        catalog: PathBuf,
        /// 照合するファイル名
        filename: String,
        /// 追加のメタデータタグ（key=value、複数指定可）
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },
    /// カタログをパースして内容を表示する
    Validate {
        /// カタログファイル（config.json形式）
        #[arg(long)]
        catalog: PathBuf,
    },
}

/// `match` の出力。アップロードAPIが署名に渡す内容と同じ。
#[derive(Debug, Serialize)]
struct MatchReport {
    path: String,
    object_key: String,
    fields: FileMatch,
    tags: MetadataTags,
}

/// `validate` の出力行。
#[derive(Debug, Serialize)]
struct EntrySummary {
    path: String,
    field_count: usize,
}

/// `key=value` 形式のタグをパースする。
fn parse_tag(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("key=value 形式で指定してください: {value}")),
    }
}

fn read_catalog(path: &Path) -> anyhow::Result<NamingCatalog> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("カタログの読み込みに失敗: {}", path.display()))?;
    NamingCatalog::from_json(&bytes)
        .with_context(|| format!("カタログのパースに失敗: {}", path.display()))
}

/// ファイル名を照合する。一致しなければ `None`。
///
/// タグにはアップロードAPIと同様に `filename` 自身も含める。
fn run_match(
    catalog: &NamingCatalog,
    filename: &str,
    extra_tags: &[(String, String)],
) -> Option<MatchReport> {
    let found = sds_core::find_first_match(catalog, filename)?;

    let mut tags: MetadataTags = extra_tags.iter().cloned().collect();
    tags.insert("filename".to_string(), filename.to_string());

    Some(MatchReport {
        path: found.entry.path.clone(),
        object_key: found.destination_key(filename),
        fields: found.fields,
        tags,
    })
}

fn summarize(catalog: &NamingCatalog) -> Vec<EntrySummary> {
    catalog
        .iter()
        .map(|entry| EntrySummary {
            path: entry.path.clone(),
            field_count: entry.pattern.len(),
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Match {
            catalog,
            filename,
            tags,
        } => {
            let catalog = read_catalog(&catalog)?;
            let report = run_match(&catalog, &filename, &tags).with_context(|| {
                format!("ファイル名が命名規約に一致しません: {filename}")
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Validate { catalog } => {
            let parsed = read_catalog(&catalog)?;
            println!("{} entries", parsed.len());
            for summary in summarize(&parsed) {
                println!("{}", serde_json::to_string(&summary)?);
            }
        }
    }

    Ok(())
}
