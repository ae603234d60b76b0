//! エラーコードカタログモジュール
//!
//! 参照カタログ（Test Item All）の行データと、コード→説明の索引を管理する。
//! 読み込み側（xlsx/csv）から渡された `Table` を元に構築する。

use crate::error::{Error, Result};
use crate::schema::{normalize_name, CatalogField, CatalogSchema, CANONICAL_CATALOG_COLUMNS};
use crate::table::Table;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// カタログの1行
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// 索引キー（内部エラーコード、なければエラーコード）
    pub code: String,
    pub description: String,
    pub chinese_description: String,
    pub interface: String,
    pub main_function: String,
    pub version: String,
    pub note: String,
    /// Error Code 列の値
    pub error_code: String,
}

/// コード → (英文説明, 中文説明)
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    map: HashMap<String, (String, String)>,
}

impl CatalogIndex {
    /// 完全一致で検索（前後空白のみ除去、大文字小文字は区別する）
    pub fn get(&self, code: &str) -> Option<&(String, String)> {
        self.map.get(code.trim())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.map.contains_key(code.trim())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// カタログ全体
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    table: Table,
    schema: CatalogSchema,
    /// table.rows と同じ並び
    entries: Vec<CatalogEntry>,
    index: CatalogIndex,
    duplicate_codes: usize,
    source_path: Option<PathBuf>,
}

impl Catalog {
    /// 表からカタログを構築
    ///
    /// 同じコードが複数行にある場合は最初の行を採用する。
    pub fn from_table(table: Table) -> Result<Self> {
        let schema = CatalogSchema::detect(&table.headers);
        if !schema.has_code_column() {
            return Err(Error::ColumnMissing {
                column: CatalogField::InternalCode.canonical_name().to_string(),
                found: table.headers.clone(),
            });
        }

        let mut entries = Vec::with_capacity(table.len());
        let mut map = HashMap::new();
        let mut duplicate_codes = 0;

        for row_idx in 0..table.len() {
            let field = |f: CatalogField| -> String {
                schema
                    .column(f)
                    .map(|col| clean_value(table.cell(row_idx, col), &table.headers[col]))
                    .unwrap_or_default()
                    .to_string()
            };

            let internal = field(CatalogField::InternalCode);
            let error_code = field(CatalogField::ErrorCode);
            let code = if internal.is_empty() { error_code.clone() } else { internal };

            let entry = CatalogEntry {
                code,
                description: field(CatalogField::Description),
                chinese_description: field(CatalogField::Chinese),
                interface: field(CatalogField::Interface),
                main_function: field(CatalogField::MainFunction),
                version: field(CatalogField::Version),
                note: field(CatalogField::Note),
                error_code,
            };

            if !entry.code.is_empty() {
                if map.contains_key(&entry.code) {
                    duplicate_codes += 1;
                    debug!("重複コードを無視: {}", entry.code);
                } else {
                    map.insert(
                        entry.code.clone(),
                        (entry.description.clone(), entry.chinese_description.clone()),
                    );
                }
            }

            entries.push(entry);
        }

        if duplicate_codes > 0 {
            warn!("カタログに重複コードが {} 件あります（先頭行を採用）", duplicate_codes);
        }

        Ok(Self {
            table,
            schema,
            entries,
            index: CatalogIndex { map },
            duplicate_codes,
            source_path: None,
        })
    }

    /// (コード, 英文, 中文) の組から正規8列のカタログを作る
    pub fn from_pairs(pairs: &[(&str, &str, &str)]) -> Self {
        let headers = CANONICAL_CATALOG_COLUMNS.iter().map(|s| s.to_string()).collect();
        let rows = pairs
            .iter()
            .map(|(code, description, chinese)| {
                vec![
                    String::new(),
                    String::new(),
                    code.to_string(),
                    description.to_string(),
                    chinese.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                ]
            })
            .collect();
        // 正規8列なのでコード列は必ず見つかる
        Self::from_table(Table::new(headers, rows)).unwrap_or_default()
    }

    /// 読み込み元のパスを記録する
    pub fn with_source_path(mut self, path: &Path) -> Self {
        self.source_path = Some(path.to_path_buf());
        self
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn schema(&self) -> &CatalogSchema {
        &self.schema
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn duplicate_codes(&self) -> usize {
        self.duplicate_codes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 完全一致検索
    pub fn lookup(&self, code: &str) -> Option<&(String, String)> {
        self.index.get(code)
    }

    /// 表の任意の行からコードを取り出す（コード方針は索引と同じ）
    pub fn code_of_row(&self, row: &[String]) -> Option<String> {
        let pick = |field: CatalogField| {
            self.schema.column(field).and_then(|col| {
                let header = self.table.headers.get(col).map(|h| h.as_str()).unwrap_or("");
                let value = clean_value(row.get(col).map(|s| s.as_str()).unwrap_or(""), header);
                (!value.is_empty()).then(|| value.to_string())
            })
        };
        pick(CatalogField::InternalCode).or_else(|| pick(CatalogField::ErrorCode))
    }

    /// 複数キーワードのAND検索（最大3語、大文字小文字無視、全列対象）
    pub fn search_all(&self, queries: &[&str]) -> Vec<&CatalogEntry> {
        let queries: Vec<String> = queries
            .iter()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
            .take(3)
            .collect();

        self.table
            .rows
            .iter()
            .zip(&self.entries)
            .filter(|(row, _)| {
                queries.iter().all(|q| row.iter().any(|cell| cell.to_lowercase().contains(q)))
            })
            .map(|(_, entry)| entry)
            .collect()
    }
}

/// セル値を整える
///
/// 前後空白を除去し、`nan` や列名そのもの（ヘッダーの混入）は空とみなす。
pub fn clean_value<'a>(value: &'a str, header: &str) -> &'a str {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return "";
    }
    let normalized = normalize_name(value);
    if !normalized.is_empty() && normalized == normalize_name(header) {
        return "";
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_table(rows: &[[&str; 8]]) -> Table {
        Table::new(
            CANONICAL_CATALOG_COLUMNS.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_from_pairs_lookup() {
        let catalog = Catalog::from_pairs(&[("E001", "PC fails to boot", "開機失敗")]);
        assert_eq!(
            catalog.lookup("E001"),
            Some(&("PC fails to boot".to_string(), "開機失敗".to_string()))
        );
        assert_eq!(catalog.lookup("  E001 "), catalog.lookup("E001"));
        assert!(catalog.lookup("e001").is_none());
    }

    #[test]
    fn test_falls_back_to_error_code_column() {
        let table = canonical_table(&[
            ["AFM", "RCA", "", "Audio fail", "音訊失敗", "1", "BSF001", ""],
            ["AFM", "RCA", "nan", "Audio noise", "雜音", "1", "BSF002", ""],
        ]);
        let catalog = Catalog::from_table(table).unwrap();
        assert!(catalog.index().contains("BSF001"));
        assert!(catalog.index().contains("BSF002"));
        assert_eq!(catalog.entries()[0].code, "BSF001");
    }

    #[test]
    fn test_header_text_leak_is_rejected() {
        let table = canonical_table(&[
            ["Main Function", "Interface", "Internal Error Code", "Description", "Chinese", "Version", "Error Code", "Note"],
            ["AFM", "RCA", "AFFY001", "Audio fail", "音訊失敗", "1", "", ""],
        ]);
        let catalog = Catalog::from_table(table).unwrap();
        assert_eq!(catalog.index().len(), 1);
        assert!(catalog.entries()[0].code.is_empty());
        assert!(catalog.index().contains("AFFY001"));
    }

    #[test]
    fn test_duplicate_codes_first_wins() {
        let catalog = Catalog::from_pairs(&[
            ("E001", "first", "一"),
            ("E001", "second", "二"),
        ]);
        assert_eq!(catalog.lookup("E001").unwrap().0, "first");
        assert_eq!(catalog.duplicate_codes(), 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_missing_code_column_is_error() {
        let table = Table::new(vec!["Name".into(), "Value".into()], vec![]);
        let result = Catalog::from_table(table);
        match result {
            Err(Error::ColumnMissing { found, .. }) => {
                assert_eq!(found, vec!["Name".to_string(), "Value".to_string()]);
            }
            other => panic!("Expected ColumnMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_values_are_trimmed() {
        let catalog = Catalog::from_pairs(&[(" E002 ", "  Fan stop ", " 風扇停止 ")]);
        assert_eq!(
            catalog.lookup("E002"),
            Some(&("Fan stop".to_string(), "風扇停止".to_string()))
        );
    }

    #[test]
    fn test_search_all_and_semantics() {
        let catalog = Catalog::from_pairs(&[
            ("E001", "PC fails to boot", "開機失敗"),
            ("E002", "PC fan stop", "風扇停止"),
            ("E003", "DUT boot timeout", "開機逾時"),
        ]);
        let hits = catalog.search_all(&["pc", "BOOT"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "E001");

        let all = catalog.search_all(&[]);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("  E001 ", "Internal Error Code"), "E001");
        assert_eq!(clean_value("nan", "Chinese"), "");
        assert_eq!(clean_value("Chinese", "Chinese"), "");
        assert_eq!(clean_value("Interenal Error Code", "Interenal Error Code"), "");
        assert_eq!(clean_value("開機失敗", "Chinese"), "開機失敗");
    }
}
