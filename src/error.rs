use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ファイルを読み込めません: {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    #[error("シート '{sheet}' がありません (存在するシート: {available:?})")]
    TableMissing { sheet: String, available: Vec<String> },

    #[error("文字コードを判定できません: {path} (試行: {})", .attempted.join(", "))]
    EncodingExhausted { path: PathBuf, attempted: Vec<String> },

    #[error("出力先が使用中です: {path} ({attempts}回試行)")]
    OutputLocked { path: PathBuf, attempts: usize },

    /// 推薦件数が行数に足りない（補完されるため致命的ではない）
    #[error("推薦件数が不足しています: 期待 {expected} 件, 実際 {actual} 件")]
    RecommendationUnderflow { expected: usize, actual: usize },

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV解析エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Common(#[from] errorcode_common::Error),
}

pub type Result<T> = std::result::Result<T, CompareError>;
