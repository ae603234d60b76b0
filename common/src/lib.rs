//! Error Code Compare Common Library
//!
//! CLIと将来のフロントエンドで共有される、I/Oを持たない処理:
//! 表とヘッダー検出、カタログ索引、完全一致照合、キーワード推薦、
//! プロンプト生成とAI応答パース、レポート生成コア

pub mod types;
pub mod error;
pub mod table;
pub mod schema;
pub mod catalog;
pub mod reconcile;
pub mod keywords;
pub mod recommender;
pub mod prompts;
pub mod parser;
pub mod layout;
pub mod export;

pub use types::{
    align_recommendations, Alignment, MatchResult, NotFoundText, Recommendation, SourceRecord,
};
pub use error::{Error, Result};
pub use table::{detect_header, HeaderDetection, HeaderStrategy, Table};
pub use schema::{CatalogField, CatalogSchema, CANONICAL_CATALOG_COLUMNS};
pub use catalog::{Catalog, CatalogEntry, CatalogIndex};
pub use reconcile::{reconcile, source_records, SourceSchema};
pub use keywords::extract_keywords;
pub use recommender::{
    validate_recommendations, RankingPolicy, RecommendationStats, Recommender,
};
pub use prompts::{build_prompt, PromptKind};
pub use parser::{parse_ai_response, parse_recommendations, to_recommendations};
