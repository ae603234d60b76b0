//! 表データとヘッダー行検出
//!
//! シートを文字列グリッドとして受け取り、ヘッダー行を決めて `Table` にする。
//! ヘッダー検出は名前付き戦略の順番試行で、最初に成功したものを採用する:
//! 1. first-row
//! 2. skip-1
//! 3. skip-2
//! 4. anchor（アンカー文字列を含む行）
//! 5. fallback-first-row

/// ヘッダー付きの表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// グリッドの `header_row` 行目をヘッダーとして表を作る
    ///
    /// 列数はヘッダー行以降で最も長い行に揃え、ヘッダー名は前後の空白を除去する。
    pub fn from_grid(grid: &[Vec<String>], header_row: usize) -> Self {
        if header_row >= grid.len() {
            return Self::default();
        }
        let width = grid[header_row..].iter().map(|r| r.len()).max().unwrap_or(0);

        let mut headers: Vec<String> = grid[header_row]
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        headers.resize(width, String::new());

        let rows = grid[header_row + 1..]
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// セル値（範囲外は空文字）
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// 列名を検索（大文字小文字・前後空白を無視）
    pub fn find_column(&self, target: &str) -> Option<usize> {
        let target = target.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == target)
    }

    /// 候補名を順に試し、最初に見つかった列を返す
    pub fn find_any_column(&self, targets: &[&str]) -> Option<usize> {
        targets.iter().find_map(|t| self.find_column(t))
    }

    /// 列の値を上から順に返す
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col))
    }

    /// 列 `col` を値で置き換える（足りない行は空文字）
    pub fn set_column(&mut self, col: usize, values: &[String]) {
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            if row.len() <= col {
                row.resize(col + 1, String::new());
            }
            row[col] = values.get(row_idx).cloned().unwrap_or_default();
        }
    }

    /// 末尾に列を追加し、その列番号を返す
    pub fn push_column(&mut self, header: &str, values: &[String]) -> usize {
        let col = self.headers.len();
        self.headers.push(header.to_string());
        for row in self.rows.iter_mut() {
            row.resize(col, String::new());
        }
        self.set_column(col, values);
        col
    }
}

/// 自動生成されたプレースホルダー列名か（空欄や `Unnamed: 3` など）
pub fn is_placeholder_header(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with("Unnamed:")
}

/// ヘッダー検出戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStrategy {
    FirstRow,
    SkipRows(usize),
    Anchor,
    FallbackFirstRow,
}

impl std::fmt::Display for HeaderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderStrategy::FirstRow => write!(f, "first-row"),
            HeaderStrategy::SkipRows(n) => write!(f, "skip-{}", n),
            HeaderStrategy::Anchor => write!(f, "anchor"),
            HeaderStrategy::FallbackFirstRow => write!(f, "fallback-first-row"),
        }
    }
}

/// ヘッダー検出結果
#[derive(Debug, Clone)]
pub struct HeaderDetection {
    pub table: Table,
    pub strategy: HeaderStrategy,
    /// グリッド上のヘッダー行番号（0始まり）
    pub header_row: usize,
    /// 試した戦略名（採用したものを含む）
    pub attempted: Vec<String>,
}

/// ヘッダー行を検出して表にする
pub fn detect_header(grid: &[Vec<String>], anchor: &str) -> HeaderDetection {
    let mut attempted = Vec::new();

    let row_strategies = [
        (HeaderStrategy::FirstRow, 0usize),
        (HeaderStrategy::SkipRows(1), 1),
        (HeaderStrategy::SkipRows(2), 2),
    ];

    for (strategy, header_row) in row_strategies {
        attempted.push(strategy.to_string());
        if header_row >= grid.len() {
            continue;
        }
        let table = Table::from_grid(grid, header_row);
        if !table.headers.is_empty() && !table.headers.iter().any(|h| is_placeholder_header(h)) {
            return HeaderDetection { table, strategy, header_row, attempted };
        }
    }

    attempted.push(HeaderStrategy::Anchor.to_string());
    if !anchor.is_empty() {
        if let Some(header_row) = grid
            .iter()
            .position(|row| row.iter().any(|cell| cell.contains(anchor)))
        {
            return HeaderDetection {
                table: Table::from_grid(grid, header_row),
                strategy: HeaderStrategy::Anchor,
                header_row,
                attempted,
            };
        }
    }

    attempted.push(HeaderStrategy::FallbackFirstRow.to_string());
    HeaderDetection {
        table: Table::from_grid(grid, 0),
        strategy: HeaderStrategy::FallbackFirstRow,
        header_row: 0,
        attempted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    // =============================================
    // find_column テスト
    // =============================================

    #[test]
    fn test_find_column_ignores_case_and_whitespace() {
        let table = Table::new(vec![" description ".into(), "TESTID".into()], vec![]);
        assert_eq!(table.find_column("Description"), Some(0));
        assert_eq!(table.find_column("TestID"), Some(1));
        assert_eq!(table.find_column("Note"), None);
    }

    #[test]
    fn test_find_any_column_uses_first_hit() {
        let table = Table::new(vec!["Error Code".into(), "Test ID".into()], vec![]);
        assert_eq!(table.find_any_column(&["TestID", "Test ID", "Error Code"]), Some(1));
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let table = Table::new(vec!["A".into()], vec![vec!["x".into()]]);
        assert_eq!(table.cell(0, 0), "x");
        assert_eq!(table.cell(0, 5), "");
        assert_eq!(table.cell(9, 0), "");
    }

    #[test]
    fn test_push_column_pads_rows() {
        let mut table = Table::new(
            vec!["A".into(), "B".into()],
            vec![vec!["1".into()], vec!["2".into(), "3".into()]],
        );
        let col = table.push_column("C", &["c1".into()]);
        assert_eq!(col, 2);
        assert_eq!(table.rows[0], vec!["1", "", "c1"]);
        assert_eq!(table.rows[1], vec!["2", "3", ""]);
    }

    // =============================================
    // detect_header テスト
    // =============================================

    #[test]
    fn test_detect_header_first_row() {
        let g = grid(&[&["Description", "TestID"], &["boot", "E001"]]);
        let detection = detect_header(&g, "Main Function");
        assert_eq!(detection.strategy, HeaderStrategy::FirstRow);
        assert_eq!(detection.table.len(), 1);
        assert_eq!(detection.attempted, vec!["first-row"]);
    }

    #[test]
    fn test_detect_header_skips_banner_row() {
        let g = grid(&[
            &["Report title", ""],
            &[" Description ", "TestID "],
            &["boot", "E001"],
        ]);
        let detection = detect_header(&g, "Main Function");
        assert_eq!(detection.strategy, HeaderStrategy::SkipRows(1));
        assert_eq!(detection.table.headers, vec!["Description", "TestID"]);
        assert_eq!(detection.table.rows, vec![vec!["boot", "E001"]]);
    }

    #[test]
    fn test_detect_header_anchor_row() {
        let g = grid(&[
            &["", "", ""],
            &["title", "", ""],
            &["", "sub", ""],
            &["Main Function", "Description", "TestID"],
            &["AFM", "boot", "E001"],
        ]);
        let detection = detect_header(&g, "Main Function");
        assert_eq!(detection.strategy, HeaderStrategy::Anchor);
        assert_eq!(detection.header_row, 3);
        assert_eq!(detection.table.len(), 1);
        assert_eq!(
            detection.attempted,
            vec!["first-row", "skip-1", "skip-2", "anchor"]
        );
    }

    #[test]
    fn test_detect_header_falls_back_to_first_row() {
        let g = grid(&[&["a", ""], &["", "b"], &["c", ""], &["d", "e"]]);
        let detection = detect_header(&g, "Main Function");
        assert_eq!(detection.strategy, HeaderStrategy::FallbackFirstRow);
        assert_eq!(detection.header_row, 0);
        assert_eq!(detection.table.len(), 3);
    }

    #[test]
    fn test_detect_header_empty_grid() {
        let detection = detect_header(&[], "Main Function");
        assert!(detection.table.headers.is_empty());
        assert!(detection.table.is_empty());
    }

    #[test]
    fn test_is_placeholder_header() {
        assert!(is_placeholder_header(""));
        assert!(is_placeholder_header("  "));
        assert!(is_placeholder_header("Unnamed: 2"));
        assert!(!is_placeholder_header("Description"));
    }
}
