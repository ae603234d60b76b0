//! 照合結果の型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - SourceRecord: 来源シートの1行（説明 + 記入されたコード）
//! - MatchResult: 完全一致照合の結果
//! - Recommendation: キーワード推薦の結果（最大2候補）

use serde::{Deserialize, Serialize};

/// 来源データの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub description: String,
    pub assigned_code: String,
}

impl SourceRecord {
    pub fn new(description: impl Into<String>, assigned_code: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            assigned_code: assigned_code.into(),
        }
    }
}

/// 照合できなかった場合に埋める文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundText {
    pub description: String,
    pub chinese: String,
}

impl Default for NotFoundText {
    fn default() -> Self {
        Self {
            description: "查無說明".into(),
            chinese: "查無中文說明".into(),
        }
    }
}

/// 完全一致照合の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub record: SourceRecord,
    pub matched_description: String,
    pub matched_chinese: String,
    /// カタログに存在したか（false の場合は NotFoundText が入っている）
    pub found: bool,
}

/// 推薦結果（位置で SourceRecord と対応する）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub candidate1: String,
    pub candidate2: String,
    pub candidate1_chinese: String,
    pub candidate2_chinese: String,
}

impl Recommendation {
    /// (コード, 中文説明) の候補列から組み立てる。3件目以降は無視
    pub fn from_candidates(candidates: &[(String, String)]) -> Self {
        let mut rec = Self::default();
        if let Some((code, chinese)) = candidates.first() {
            rec.candidate1 = code.clone();
            rec.candidate1_chinese = chinese.clone();
        }
        if let Some((code, chinese)) = candidates.get(1) {
            rec.candidate2 = code.clone();
            rec.candidate2_chinese = chinese.clone();
        }
        rec
    }

    pub fn is_empty(&self) -> bool {
        self.candidate1.is_empty() && self.candidate2.is_empty()
    }

    /// 非空の候補数
    pub fn candidate_count(&self) -> usize {
        [&self.candidate1, &self.candidate2]
            .iter()
            .filter(|c| !c.is_empty())
            .count()
    }
}

/// 推薦件数を行数に合わせた結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Exact,
    /// 不足分を空の推薦で補った
    Padded { expected: usize, actual: usize },
    /// 余剰分を切り捨てた
    Truncated { expected: usize, actual: usize },
}

/// 推薦リストを行数 `expected` に揃える（行は決して落とさない）
pub fn align_recommendations(
    mut recommendations: Vec<Recommendation>,
    expected: usize,
) -> (Vec<Recommendation>, Alignment) {
    let actual = recommendations.len();
    let alignment = if actual < expected {
        recommendations.resize_with(expected, Recommendation::default);
        Alignment::Padded { expected, actual }
    } else if actual > expected {
        recommendations.truncate(expected);
        Alignment::Truncated { expected, actual }
    } else {
        Alignment::Exact
    };
    (recommendations, alignment)
}
