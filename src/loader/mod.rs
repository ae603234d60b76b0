//! 入力ファイル読み込み
//!
//! - workbook: calamine でシートを文字列グリッドに
//! - catalog: カタログ（xlsx / 区切りテキスト）
//! - source: 来源シート（ヘッダー自動検出）

pub mod catalog;
pub mod source;
pub mod workbook;

pub use catalog::{decode_with_strategies, load_catalog, CatalogOptions};
pub use source::{load_source_sheet, SourceSheet};
pub use workbook::{is_spreadsheet, read_sheet_grid, sheet_names};
