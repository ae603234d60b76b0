//! ワークブック読み込み（calamine）
//!
//! シートを文字列グリッドとして取り出す。calamine の Range は最初の
//! 非空セルから始まるため、先頭の空行・空列を補ってシートの1行目・A列に揃える。

use crate::error::{CompareError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::error;

/// スプレッドシートとして読む拡張子
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 拡張子がスプレッドシートか
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn check_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompareError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn unreadable(path: &Path, reason: impl std::fmt::Display) -> CompareError {
    let err = CompareError::FileUnreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    error!("{}", err);
    err
}

/// シート名一覧
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    check_exists(path)?;
    let workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;
    Ok(workbook.sheet_names().to_vec())
}

/// シートを文字列グリッドとして読む
///
/// シートが存在しない場合は `TableMissing`（実在するシート名付き）。
pub fn read_sheet_grid(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>> {
    check_exists(path)?;
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;

    let available = workbook.sheet_names().to_vec();
    if !available.iter().any(|s| s == sheet) {
        let err = CompareError::TableMissing {
            sheet: sheet.to_string(),
            available,
        };
        error!("{}", err);
        return Err(err);
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| unreadable(path, e))?;
    Ok(range_to_grid(&range))
}

/// Range をシート原点基準のグリッドに変換
pub fn range_to_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    let mut grid: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }
    grid
}

/// セル値を文字列に（整数値の浮動小数は小数点なし）
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::String("E001".into())), "E001");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_range_to_grid_pads_offset() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Description".into()));
        range.set_value((2, 2), Data::String("TestID".into()));
        range.set_value((3, 1), Data::String("boot".into()));
        range.set_value((3, 2), Data::Float(1.0));

        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 4);
        assert!(grid[0].is_empty());
        assert!(grid[1].is_empty());
        assert_eq!(grid[2], vec!["", "Description", "TestID"]);
        assert_eq!(grid[3], vec!["", "boot", "1"]);
    }

    #[test]
    fn test_range_to_grid_empty() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_grid(&range).is_empty());
    }

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("a.xlsx")));
        assert!(is_spreadsheet(Path::new("a.XLS")));
        assert!(!is_spreadsheet(Path::new("a.csv")));
        assert!(!is_spreadsheet(Path::new("noext")));
    }

    #[test]
    fn test_missing_file() {
        let result = sheet_names(Path::new("/nonexistent/book.xlsx"));
        assert!(matches!(result, Err(CompareError::FileNotFound(_))));
    }
}
