//! 比較レポートExcel生成（共通ライブラリ）
//!
//! layout.rs の書式定数を使って2シート構成のレポートを生成:
//! - 1枚目: 照合結果（＋推薦列）
//! - 2枚目: カタログ表のコピー（照合済みコードの行を強調）

use crate::catalog::Catalog;
use crate::layout::{
    column_widths, BORDER_RGB, FONT_NAME, FONT_SIZE, HEADER_FILL_RGB, HIGHLIGHT_FILL_RGB,
};
use crate::table::Table;
use crate::types::{MatchResult, Recommendation};
use rust_xlsxwriter::*;
use std::collections::{BTreeSet, HashSet};

/// 照合結果の列（固定順）
pub const MAIN_COLUMNS: [&str; 4] = [
    "Your Description",
    "Your Error Code",
    "Catalog Description",
    "Catalog Chinese",
];

/// 推薦列（固定順）
pub const RECOMMENDATION_COLUMNS: [&str; 4] = [
    "AI-recommended ID 1",
    "AI-recommended ID 2",
    "AI-recommended ID 1 (Chinese)",
    "AI-recommended ID 2 (Chinese)",
];

/// 強調対象のコードを取る列
pub const HIGHLIGHT_SOURCE_COLUMN: &str = "Your Error Code";

/// Excelのシート名上限
const MAX_SHEET_NAME_LEN: usize = 31;

/// 出力するレポート
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub main_sheet: String,
    pub main: Table,
    pub catalog_sheet: String,
    pub catalog: Table,
    /// 強調するカタログ表の行番号
    pub highlight_rows: BTreeSet<usize>,
}

/// 照合結果から1枚目の表を作る
pub fn build_main_table(results: &[MatchResult]) -> Table {
    let headers = MAIN_COLUMNS.iter().map(|s| s.to_string()).collect();
    let rows = results
        .iter()
        .map(|r| {
            vec![
                r.record.description.clone(),
                r.record.assigned_code.clone(),
                r.matched_description.clone(),
                r.matched_chinese.clone(),
            ]
        })
        .collect();
    Table::new(headers, rows)
}

/// 推薦列を追加または上書きする
///
/// 同名の列があればその場で上書きし、なければ末尾に追加する。
/// 既存列の順序は変えない。推薦数は呼び出し側で行数に揃えておくこと。
pub fn annotate_recommendations(table: &mut Table, recommendations: &[Recommendation]) {
    let columns: [Vec<String>; 4] = [
        recommendations.iter().map(|r| r.candidate1.clone()).collect(),
        recommendations.iter().map(|r| r.candidate2.clone()).collect(),
        recommendations.iter().map(|r| r.candidate1_chinese.clone()).collect(),
        recommendations.iter().map(|r| r.candidate2_chinese.clone()).collect(),
    ];

    for (header, values) in RECOMMENDATION_COLUMNS.iter().zip(columns.iter()) {
        match table.find_column(header) {
            Some(col) => table.set_column(col, values),
            None => {
                table.push_column(header, values);
            }
        }
    }
}

/// 1枚目の `Your Error Code` 列から強調対象コードを集める
pub fn highlight_codes(main: &Table) -> HashSet<String> {
    match main.find_column(HIGHLIGHT_SOURCE_COLUMN) {
        Some(col) => main
            .column(col)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect(),
        None => HashSet::new(),
    }
}

/// コードが集合に含まれるカタログ行の番号
pub fn highlight_rows(catalog: &Catalog, codes: &HashSet<String>) -> BTreeSet<usize> {
    catalog
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.code.is_empty() && codes.contains(&entry.code))
        .map(|(row, _)| row)
        .collect()
}

/// シート名をExcelの制約に合わせる
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

struct Formats {
    header: Format,
    data: Format,
    highlight: Format,
}

impl Formats {
    fn new() -> Self {
        let base = Format::new()
            .set_font_name(FONT_NAME)
            .set_font_size(FONT_SIZE)
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(BORDER_RGB))
            .set_align(FormatAlign::VerticalCenter);

        Self {
            header: base
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(HEADER_FILL_RGB)),
            highlight: base.clone().set_background_color(Color::RGB(HIGHLIGHT_FILL_RGB)),
            data: base,
        }
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    table: &Table,
    highlight: &BTreeSet<usize>,
    formats: &Formats,
) -> Result<(), String> {
    worksheet
        .set_name(name)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &formats.header)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let format = if highlight.contains(&row_idx) {
            &formats.highlight
        } else {
            &formats.data
        };
        for col in 0..table.headers.len() {
            let value = row.get(col).map(|s| s.as_str()).unwrap_or("");
            worksheet
                .write_string_with_format(row_idx as u32 + 1, col as u16, value, format)
                .map_err(|e| format!("セル書き込みエラー: {}", e))?;
        }
    }

    for (col, width) in column_widths(&table.headers, &table.rows).into_iter().enumerate() {
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    Ok(())
}

/// レポートをバッファに生成
///
/// 全シートをメモリ上で組み立ててから一度に書き出す。
pub fn generate_report_buffer(report: &Report) -> Result<Vec<u8>, String> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let catalog_name = sanitize_sheet_name(&report.catalog_sheet);
    let mut main_name = sanitize_sheet_name(&report.main_sheet);
    if main_name.eq_ignore_ascii_case(&catalog_name) {
        main_name = "Compare".to_string();
    }

    let no_highlight = BTreeSet::new();
    let main_sheet = workbook.add_worksheet();
    write_sheet(main_sheet, &main_name, &report.main, &no_highlight, &formats)?;

    let catalog_sheet = workbook.add_worksheet();
    write_sheet(
        catalog_sheet,
        &catalog_name,
        &report.catalog,
        &report.highlight_rows,
        &formats,
    )?;

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceRecord;

    fn result(desc: &str, code: &str, found: bool) -> MatchResult {
        MatchResult {
            record: SourceRecord::new(desc, code),
            matched_description: if found { "matched".into() } else { "查無說明".into() },
            matched_chinese: if found { "對應".into() } else { "查無中文說明".into() },
            found,
        }
    }

    #[test]
    fn test_build_main_table() {
        let table = build_main_table(&[result("boot", "E001", true), result("x", "E9", false)]);
        assert_eq!(table.headers, MAIN_COLUMNS.to_vec());
        assert_eq!(table.rows[0], vec!["boot", "E001", "matched", "對應"]);
        assert_eq!(table.rows[1][2], "查無說明");
    }

    #[test]
    fn test_annotate_appends_then_overwrites() {
        let mut table = build_main_table(&[result("boot", "E001", true)]);
        let first = vec![Recommendation::from_candidates(&[("E001".into(), "開機".into())])];
        annotate_recommendations(&mut table, &first);
        assert_eq!(table.column_count(), 8);
        assert_eq!(table.rows[0][4], "E001");
        assert_eq!(table.rows[0][6], "開機");

        let second = vec![Recommendation::from_candidates(&[
            ("E002".into(), String::new()),
            ("E003".into(), String::new()),
        ])];
        annotate_recommendations(&mut table, &second);
        assert_eq!(table.column_count(), 8);
        assert_eq!(table.rows[0][4], "E002");
        assert_eq!(table.rows[0][5], "E003");
        assert_eq!(table.rows[0][6], "");
    }

    #[test]
    fn test_annotate_keeps_existing_column_order() {
        let mut table = Table::new(
            vec![
                "AI-recommended ID 2".into(),
                "Your Description".into(),
            ],
            vec![vec!["old".into(), "boot".into()]],
        );
        let recs = vec![Recommendation::from_candidates(&[
            ("A".into(), String::new()),
            ("B".into(), String::new()),
        ])];
        annotate_recommendations(&mut table, &recs);
        assert_eq!(table.headers[0], "AI-recommended ID 2");
        assert_eq!(table.headers[1], "Your Description");
        assert_eq!(table.rows[0][0], "B");
        assert_eq!(table.headers[2], "AI-recommended ID 1");
        assert_eq!(table.rows[0][2], "A");
    }

    #[test]
    fn test_highlight_rows() {
        let main = build_main_table(&[result("a", " E002 ", true), result("b", "", false)]);
        let codes = highlight_codes(&main);
        assert_eq!(codes.len(), 1);

        let catalog = Catalog::from_pairs(&[("E001", "", ""), ("E002", "", ""), ("E003", "", "")]);
        let rows = highlight_rows(&catalog, &codes);
        assert_eq!(rows.into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_sheet_name(""), "Sheet1");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn test_generate_report_buffer() {
        let catalog = Catalog::from_pairs(&[("E001", "PC fails to boot", "開機失敗")]);
        let main = build_main_table(&[result("Check boot fail", "E001", true)]);
        let report = Report {
            main_sheet: "Sheet1".into(),
            highlight_rows: highlight_rows(&catalog, &highlight_codes(&main)),
            main,
            catalog_sheet: "Test Item All".into(),
            catalog: catalog.table().clone(),
        };
        let buffer = generate_report_buffer(&report).unwrap();
        // xlsx は zip 形式
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_report_buffer_same_sheet_names() {
        let report = Report {
            main_sheet: "Test Item All".into(),
            catalog_sheet: "Test Item All".into(),
            ..Default::default()
        };
        assert!(generate_report_buffer(&report).is_ok());
    }
}
