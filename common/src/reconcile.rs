//! 完全一致照合
//!
//! 来源シートの各行のコードをカタログ索引で引き、説明を付ける。
//! あいまい検索は行わない。

use crate::catalog::CatalogIndex;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::types::{MatchResult, NotFoundText, SourceRecord};

/// 説明列名
pub const DESCRIPTION_COLUMN: &str = "Description";

/// コード列名の候補（先頭から順に探す）
pub const CODE_COLUMN_CANDIDATES: &[&str] = &["TestID", "Test ID", "Error Code"];

/// 来源シートの列位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSchema {
    pub description: usize,
    pub code: usize,
}

impl SourceSchema {
    /// 必須列を検出（見つからなければ実際の列一覧付きで ColumnMissing）
    pub fn detect(table: &Table) -> Result<Self> {
        let description = table
            .find_column(DESCRIPTION_COLUMN)
            .ok_or_else(|| Error::ColumnMissing {
                column: DESCRIPTION_COLUMN.to_string(),
                found: table.headers.clone(),
            })?;
        let code = table
            .find_any_column(CODE_COLUMN_CANDIDATES)
            .ok_or_else(|| Error::ColumnMissing {
                column: CODE_COLUMN_CANDIDATES.join(" / "),
                found: table.headers.clone(),
            })?;
        Ok(Self { description, code })
    }

    /// 表の全行を SourceRecord に変換（行は落とさない）
    pub fn records(&self, table: &Table) -> Vec<SourceRecord> {
        (0..table.len())
            .map(|row| {
                SourceRecord::new(
                    table.cell(row, self.description).trim(),
                    table.cell(row, self.code).trim(),
                )
            })
            .collect()
    }
}

/// 表から SourceRecord を取り出す
pub fn source_records(table: &Table) -> Result<Vec<SourceRecord>> {
    let schema = SourceSchema::detect(table)?;
    Ok(schema.records(table))
}

/// 各行をカタログ索引と照合（入力と同じ順序・件数）
pub fn reconcile(
    records: &[SourceRecord],
    index: &CatalogIndex,
    not_found: &NotFoundText,
) -> Vec<MatchResult> {
    records
        .iter()
        .map(|record| match index.get(&record.assigned_code) {
            Some((description, chinese)) => MatchResult {
                record: record.clone(),
                matched_description: description.clone(),
                matched_chinese: chinese.clone(),
                found: true,
            },
            None => MatchResult {
                record: record.clone(),
                matched_description: not_found.description.clone(),
                matched_chinese: not_found.chinese.clone(),
                found: false,
            },
        })
        .collect()
}
