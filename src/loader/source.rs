//! 来源シート読み込み

use super::catalog::{decode_with_strategies, parse_delimited};
use super::workbook::{is_spreadsheet, read_sheet_grid};
use crate::error::{CompareError, Result};
use errorcode_common::{detect_header, HeaderStrategy, Table};
use std::path::Path;
use tracing::{debug, info};

/// 読み込んだ来源シート
#[derive(Debug, Clone)]
pub struct SourceSheet {
    pub sheet_name: String,
    pub table: Table,
    pub header_strategy: HeaderStrategy,
}

/// 来源シートを読み込み、ヘッダー行を自動検出する
///
/// `anchor` はヘッダー行に含まれる目印の文字列。
/// 区切りテキストの場合 `sheet` はシート名としてのみ使う（ファイル名の stem を渡す想定）。
pub fn load_source_sheet(
    path: &Path,
    sheet: &str,
    anchor: &str,
    encodings: &[String],
) -> Result<SourceSheet> {
    let grid = if is_spreadsheet(path) {
        read_sheet_grid(path, sheet)?
    } else {
        read_delimited_grid(path, encodings)?
    };

    let detection = detect_header(&grid, anchor);
    debug!("ヘッダー検出の試行: {}", detection.attempted.join(" → "));
    info!(
        "来源シート '{}' のヘッダー: {} ({}行目, {}行)",
        sheet,
        detection.strategy,
        detection.header_row + 1,
        detection.table.len()
    );

    Ok(SourceSheet {
        sheet_name: sheet.to_string(),
        table: detection.table,
        header_strategy: detection.strategy,
    })
}

fn read_delimited_grid(path: &Path, encodings: &[String]) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(CompareError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let (text, _) = decode_with_strategies(&bytes, encodings).ok_or_else(|| {
        CompareError::EncodingExhausted {
            path: path.to_path_buf(),
            attempted: encodings.to_vec(),
        }
    })?;
    let delimiter = if path.extension().map(|e| e == "tsv").unwrap_or(false) {
        b'\t'
    } else {
        b','
    };
    parse_delimited(&text, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn utf8() -> Vec<String> {
        vec!["utf-8".to_string()]
    }

    #[test]
    fn test_load_csv_first_row_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        std::fs::write(&path, " Description ,TestID\nboot fail,E001\n").unwrap();

        let sheet = load_source_sheet(&path, "source", "Main Function", &utf8()).unwrap();
        assert_eq!(sheet.header_strategy, HeaderStrategy::FirstRow);
        assert_eq!(sheet.table.headers, vec!["Description", "TestID"]);
        assert_eq!(sheet.table.len(), 1);
    }

    #[test]
    fn test_load_csv_skips_title_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.csv");
        std::fs::write(&path, "Report,\nDescription,TestID\nboot fail,E001\n").unwrap();

        let sheet = load_source_sheet(&path, "source", "Main Function", &utf8()).unwrap();
        assert_eq!(sheet.header_strategy, HeaderStrategy::SkipRows(1));
        assert_eq!(sheet.table.cell(0, 1), "E001");
    }

    #[test]
    fn test_missing_source_file() {
        let result = load_source_sheet(Path::new("/nonexistent/a.csv"), "a", "", &utf8());
        assert!(matches!(result, Err(CompareError::FileNotFound(_))));
    }
}
