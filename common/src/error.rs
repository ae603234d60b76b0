//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    /// 必須列が見つからない（実際の列一覧を添える）
    #[error("Column missing: '{column}' (found columns: {found:?})")]
    ColumnMissing { column: String, found: Vec<String> },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
