//! 比較レポートExcel出力（CLI版）
//!
//! 書式・シート構成は errorcode_common::export::excel_core に任せ、
//! ここでは入出力（新規作成と既存レポートへの推薦列追記）を扱う。

use super::WriteLocks;
use crate::error::{CompareError, Result};
use crate::loader::{read_sheet_grid, sheet_names};
use crate::recommend::align_to_rows;
use errorcode_common::export::excel_core::{
    annotate_recommendations, build_main_table, generate_report_buffer, highlight_codes,
    highlight_rows, Report,
};
use errorcode_common::{Catalog, MatchResult, Recommendation, Table};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 照合結果とカタログからレポートを組み立てる
///
/// `recommendations` は行数に揃えてから渡すこと。
pub fn build_report(
    main_sheet: &str,
    results: &[MatchResult],
    recommendations: Option<&[Recommendation]>,
    catalog: &Catalog,
    catalog_sheet: &str,
) -> Report {
    let mut main = build_main_table(results);
    if let Some(recs) = recommendations {
        annotate_recommendations(&mut main, recs);
    }
    let highlight = highlight_rows(catalog, &highlight_codes(&main));
    info!("カタログ強調行: {}行", highlight.len());

    Report {
        main_sheet: main_sheet.to_string(),
        main,
        catalog_sheet: catalog_sheet.to_string(),
        catalog: catalog.table().clone(),
        highlight_rows: highlight,
    }
}

/// レポートを書き出し、実際の出力パスを返す
pub fn write_report(locks: &WriteLocks, report: &Report, output_path: &Path) -> Result<PathBuf> {
    let buffer = generate_report_buffer(report).map_err(CompareError::ExcelGeneration)?;
    locks.write_buffer_once(output_path, &buffer)
}

/// 既存レポートへの追記結果
#[derive(Debug)]
pub struct AnnotateOutcome {
    pub path: PathBuf,
    pub rows: usize,
    /// 推薦件数が不足して補完した場合の警告
    pub warning: Option<CompareError>,
}

/// 既存レポートの1枚目に推薦列を追加（同名列があれば上書き）して書き直す
///
/// 2枚目（`catalog_sheet`、なければ2番目のシート）はそのまま残し、強調行は再計算する。
pub fn annotate_existing_report(
    locks: &WriteLocks,
    path: &Path,
    recommendations: Vec<Recommendation>,
    catalog_sheet: &str,
) -> Result<AnnotateOutcome> {
    let names = sheet_names(path)?;
    let main_sheet = names.first().cloned().ok_or_else(|| CompareError::TableMissing {
        sheet: String::new(),
        available: names.clone(),
    })?;

    let mut main = Table::from_grid(&read_sheet_grid(path, &main_sheet)?, 0);
    let (recommendations, warning) = align_to_rows(recommendations, main.len());
    annotate_recommendations(&mut main, &recommendations);

    let catalog_name = if names.iter().any(|n| n == catalog_sheet) {
        Some(catalog_sheet.to_string())
    } else {
        names.get(1).cloned()
    };

    let (catalog_name, catalog_table, highlight) = match catalog_name {
        Some(name) => {
            let table = Table::from_grid(&read_sheet_grid(path, &name)?, 0);
            let highlight = match Catalog::from_table(table.clone()) {
                Ok(catalog) => highlight_rows(&catalog, &highlight_codes(&main)),
                Err(e) => {
                    warn!("カタログシートの強調を再計算できません: {}", e);
                    BTreeSet::new()
                }
            };
            (name, table, highlight)
        }
        None => {
            warn!("カタログシートが見つかりません: {}", path.display());
            (catalog_sheet.to_string(), Table::default(), BTreeSet::new())
        }
    };

    let report = Report {
        main_sheet,
        main,
        catalog_sheet: catalog_name,
        catalog: catalog_table,
        highlight_rows: highlight,
    };
    let rows = report.main.len();
    let written = write_report(locks, &report, path)?;
    info!("推薦列を追記しました: {} ({}行)", written.display(), rows);

    Ok(AnnotateOutcome {
        path: written,
        rows,
        warning,
    })
}
