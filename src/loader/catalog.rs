//! カタログ読み込み
//!
//! - スプレッドシート: 指定シートの先頭バナー行を飛ばし、次の行をヘッダーにする
//! - 区切りテキスト（csv/tsv/txt）: 文字コード候補を順に厳密デコードし、
//!   最初に成功したものを採用する

use super::workbook::{is_spreadsheet, read_sheet_grid};
use crate::error::{CompareError, Result};
use encoding_rs::{Encoding, BIG5, GBK, UTF_8, WINDOWS_1252};
use errorcode_common::schema::apply_canonical_names;
use errorcode_common::{Catalog, Table};
use std::path::Path;
use tracing::{error, info};

/// カタログ読み込み条件
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub sheet: String,
    pub skip_rows: usize,
    pub encodings: Vec<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            sheet: "Test Item All".into(),
            skip_rows: 3,
            encodings: ["utf-8", "big5", "gbk", "cp950", "latin1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 文字コード名から encoding_rs のエンコーディングを引く
pub fn encoding_for(name: &str) -> Option<&'static Encoding> {
    match name.trim().to_lowercase().as_str() {
        "utf-8" | "utf8" => Some(UTF_8),
        "big5" | "cp950" => Some(BIG5),
        "gbk" | "gb2312" | "cp936" => Some(GBK),
        "latin1" | "latin-1" | "iso-8859-1" | "cp1252" => Some(WINDOWS_1252),
        other => Encoding::for_label(other.as_bytes()),
    }
}

/// 候補を順に試して厳密デコード（置換文字を出すものは失敗扱い）
///
/// # Returns
/// (デコード結果, 採用した候補名)。全候補失敗なら None
pub fn decode_with_strategies(bytes: &[u8], strategies: &[String]) -> Option<(String, String)> {
    for name in strategies {
        let Some(encoding) = encoding_for(name) else {
            continue;
        };
        let input = if encoding == UTF_8 {
            bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
        } else {
            bytes
        };
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(input) {
            return Some((text.into_owned(), name.clone()));
        }
    }
    None
}

fn delimiter_for(path: &Path, text: &str) -> u8 {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if ext == "tsv" {
        return b'\t';
    }
    let first = text.lines().next().unwrap_or("");
    if ext == "txt" && first.contains('\t') && !first.contains(',') {
        b'\t'
    } else {
        b','
    }
}

/// 区切りテキストをグリッドに
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(grid)
}

/// 区切りテキストのカタログ表を読む（1行目がヘッダー）
pub fn read_delimited_table(path: &Path, encodings: &[String]) -> Result<Table> {
    if !path.exists() {
        return Err(CompareError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;

    let (text, encoding) = decode_with_strategies(&bytes, encodings).ok_or_else(|| {
        let err = CompareError::EncodingExhausted {
            path: path.to_path_buf(),
            attempted: encodings.to_vec(),
        };
        error!("{}", err);
        err
    })?;
    info!("文字コード {} で読み込みました: {}", encoding, path.display());

    let grid = parse_delimited(&text, delimiter_for(path, &text)).map_err(|e| {
        error!("カタログ解析エラー: {}: {}", path.display(), e);
        e
    })?;
    Ok(Table::from_grid(&grid, 0))
}

/// スプレッドシートのカタログ表を読む
///
/// 先頭 `skip_rows` 行（空行も含めて数える）を飛ばした次の行をヘッダーにし、
/// 8列以上あれば先頭8列を正規名に置き換える。
pub fn read_spreadsheet_table(path: &Path, options: &CatalogOptions) -> Result<Table> {
    let grid = read_sheet_grid(path, &options.sheet)?;
    let mut table = Table::from_grid(&grid, options.skip_rows);
    if apply_canonical_names(&mut table.headers) {
        info!("カタログ列名を正規8列に置き換えました");
    }
    Ok(table)
}

/// カタログを読み込んで索引を作る
pub fn load_catalog(path: &Path, options: &CatalogOptions) -> Result<Catalog> {
    let table = if is_spreadsheet(path) {
        read_spreadsheet_table(path, options)?
    } else {
        read_delimited_table(path, &options.encodings)?
    };

    let catalog = Catalog::from_table(table)
        .map_err(|e| {
            error!("カタログの列を特定できません: {}: {}", path.display(), e);
            CompareError::from(e)
        })?
        .with_source_path(path);

    info!(
        "カタログ読み込み完了: {} ({}行, コード{}件)",
        path.display(),
        catalog.len(),
        catalog.index().len()
    );
    Ok(catalog)
}
