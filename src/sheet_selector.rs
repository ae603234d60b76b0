//! シート対話式選択モジュール

use crate::error::{CompareError, Result};
use crate::loader::{is_spreadsheet, sheet_names};
use dialoguer::Select;
use std::io::IsTerminal;
use std::path::Path;
use tracing::info;

/// 使用するシート名を決める
///
/// 1. `explicit` が指定されていればそれ
/// 2. 区切りテキストならファイル名の stem
/// 3. 端末から実行されていれば対話式で選択
/// 4. それ以外は先頭シート
pub fn resolve_sheet(path: &Path, explicit: Option<&str>) -> Result<String> {
    if let Some(sheet) = explicit {
        return Ok(sheet.to_string());
    }
    if !is_spreadsheet(path) {
        return Ok(path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default());
    }

    let names = sheet_names(path)?;
    if names.is_empty() {
        return Err(CompareError::TableMissing {
            sheet: String::new(),
            available: names,
        });
    }

    if names.len() > 1 && std::io::stdin().is_terminal() {
        return select_sheet_interactive(&names);
    }

    info!("シート未指定のため先頭シートを使用: {}", names[0]);
    Ok(names[0].clone())
}

/// 対話式でシートを選択
pub fn select_sheet_interactive(names: &[String]) -> Result<String> {
    println!("\n📋 シートを選択してください:\n");
    let index = Select::new()
        .with_prompt("シート")
        .items(names)
        .default(0)
        .interact()
        .map_err(|e| CompareError::Config(format!("シート選択に失敗しました: {}", e)))?;

    println!("→ {} を使用", names[index]);
    Ok(names[index].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_sheet_wins() {
        let sheet = resolve_sheet(Path::new("/nonexistent/book.xlsx"), Some("Data")).unwrap();
        assert_eq!(sheet, "Data");
    }

    #[test]
    fn test_delimited_uses_file_stem() {
        let sheet = resolve_sheet(Path::new("input/source.csv"), None).unwrap();
        assert_eq!(sheet, "source");
    }
}
