//! キーワード推薦エンジン
//!
//! 説明文から抽出したキーワードでカタログを走査し、
//! 候補コードを最大2件返す。
//!
//! 検索は2段階:
//! 1. 一次検索: 英文説明/中文説明にキーワードのいずれかを含む行（OR）、
//!    または重要語（fail, error など）を元の説明と共有する行
//! 2. 二次検索: 一次検索が0件のとき、キーワードを順に全列から検索し、
//!    最初にヒットしたキーワードの結果を採用

use crate::catalog::Catalog;
use crate::keywords::extract_keywords;
use crate::types::Recommendation;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

/// 説明文に含まれていれば一次検索で優先する語
pub const IMPORTANT_KEYWORDS: &[&str] = &["fail", "error", "test", "check", "get", "set", "pc", "dut"];

/// 候補行の並べ方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingPolicy {
    /// カタログの行順（既定）
    #[default]
    ScanOrder,
    /// match_score の降順（同点は行順）
    ByScore,
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scan-order" | "scanorder" | "scan" => Ok(RankingPolicy::ScanOrder),
            "by-score" | "byscore" | "score" => Ok(RankingPolicy::ByScore),
            other => Err(format!("不明な並び順: {}", other)),
        }
    }
}

impl std::fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingPolicy::ScanOrder => write!(f, "scan-order"),
            RankingPolicy::ByScore => write!(f, "by-score"),
        }
    }
}

/// 検索でヒットした行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRow {
    /// カタログ表の行番号
    pub row: usize,
    /// 英文/中文説明に含まれたキーワード数
    pub match_score: usize,
}

/// カタログに対する推薦器
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    catalog: &'a Catalog,
    policy: RankingPolicy,
}

impl<'a> Recommender<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            policy: RankingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// キーワードで候補行を検索
    ///
    /// # Arguments
    /// * `keywords` - 小文字化済みキーワード
    /// * `description` - 元の説明文（重要語の判定に使う）
    pub fn search(&self, keywords: &[String], description: &str) -> Vec<CandidateRow> {
        if keywords.is_empty() || self.catalog.is_empty() {
            return Vec::new();
        }

        let desc_lower = description.to_lowercase();
        let important: Vec<&str> = IMPORTANT_KEYWORDS
            .iter()
            .copied()
            .filter(|kw| desc_lower.contains(kw))
            .collect();

        let mut candidates: Vec<CandidateRow> = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(row, entry)| {
                let text = [
                    entry.description.to_lowercase(),
                    entry.chinese_description.to_lowercase(),
                ];
                let match_score = score(keywords, &text);
                let has_important = important.iter().any(|kw| text.iter().any(|t| t.contains(*kw)));
                (match_score > 0 || has_important).then_some(CandidateRow { row, match_score })
            })
            .collect();

        if candidates.is_empty() {
            candidates = self.fallback_search(keywords);
        }

        if self.policy == RankingPolicy::ByScore {
            // sort_by は安定ソートなので同点は行順のまま
            candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        }

        candidates
    }

    /// キーワードを1つずつ全列から探し、最初にヒットしたものの結果を返す
    fn fallback_search(&self, keywords: &[String]) -> Vec<CandidateRow> {
        let rows = &self.catalog.table().rows;
        for keyword in keywords {
            let hits: Vec<CandidateRow> = rows
                .iter()
                .enumerate()
                .filter(|(_, cells)| cells.iter().any(|c| c.to_lowercase().contains(keyword.as_str())))
                .map(|(row, _)| {
                    let entry = &self.catalog.entries()[row];
                    let text = [
                        entry.description.to_lowercase(),
                        entry.chinese_description.to_lowercase(),
                    ];
                    CandidateRow { row, match_score: score(keywords, &text) }
                })
                .collect();
            if !hits.is_empty() {
                debug!("二次検索でヒット: '{}' ({}件)", keyword, hits.len());
                return hits;
            }
        }
        Vec::new()
    }

    /// 候補行から重複しないコードを最大2件取り出す
    pub fn extract_candidates(&self, rows: &[CandidateRow]) -> Vec<(String, String)> {
        let mut picked: Vec<(String, String)> = Vec::with_capacity(2);
        for candidate in rows {
            let entry = &self.catalog.entries()[candidate.row];
            if entry.code.is_empty() || picked.iter().any(|(code, _)| code == &entry.code) {
                continue;
            }
            picked.push((entry.code.clone(), entry.chinese_description.clone()));
            if picked.len() >= 2 {
                break;
            }
        }
        picked
    }

    /// 1件の説明文に対する推薦
    pub fn recommend(&self, description: &str) -> Recommendation {
        if description.trim().is_empty() {
            return Recommendation::default();
        }
        let keywords = extract_keywords(description);
        if keywords.is_empty() {
            return Recommendation::default();
        }
        let rows = self.search(&keywords, description);
        Recommendation::from_candidates(&self.extract_candidates(&rows))
    }

    /// 説明文リストに対する推薦（入力と同じ長さ・順序で返す）
    pub fn generate_recommendations_with_search(&self, descriptions: &[String]) -> Vec<Recommendation> {
        if self.catalog.is_empty() {
            warn!("カタログが空のため推薦は全て空になります");
            return vec![Recommendation::default(); descriptions.len()];
        }
        descriptions.iter().map(|d| self.recommend(d)).collect()
    }
}

fn score(keywords: &[String], text: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| text.iter().any(|t| t.contains(kw.as_str())))
        .count()
}

/// 推薦結果の統計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationStats {
    pub total: usize,
    pub valid_first: usize,
    pub valid_second: usize,
    pub both_valid: usize,
    pub first_rate: f64,
    pub second_rate: f64,
    pub both_valid_rate: f64,
}

impl From<&[Recommendation]> for RecommendationStats {
    fn from(recommendations: &[Recommendation]) -> Self {
        let total = recommendations.len();
        let valid_first = recommendations.iter().filter(|r| !r.candidate1.is_empty()).count();
        let valid_second = recommendations.iter().filter(|r| !r.candidate2.is_empty()).count();
        let both_valid = recommendations
            .iter()
            .filter(|r| !r.candidate1.is_empty() && !r.candidate2.is_empty())
            .count();
        let rate = |n: usize| if total > 0 { n as f64 / total as f64 } else { 0.0 };

        Self {
            total,
            valid_first,
            valid_second,
            both_valid,
            first_rate: rate(valid_first),
            second_rate: rate(valid_second),
            both_valid_rate: rate(both_valid),
        }
    }
}

/// 推薦結果の妥当性チェック
///
/// 件数が説明文数と異なる、または半数を超える行が空なら false
pub fn validate_recommendations(recommendations: &[Recommendation], description_count: usize) -> bool {
    if recommendations.len() != description_count {
        warn!(
            "推薦数 ({}) と説明文数 ({}) が一致しません",
            recommendations.len(),
            description_count
        );
        return false;
    }
    let empty = recommendations.iter().filter(|r| r.is_empty()).count();
    if empty * 2 > recommendations.len() {
        warn!("空の推薦が多すぎます ({}/{})", empty, recommendations.len());
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog::from_pairs(&[
            ("E001", "PC fails to boot", "開機失敗"),
            ("E002", "Fan speed low", "風扇轉速低"),
            ("E003", "Boot device missing", "找不到開機裝置"),
            ("E004", "Audio noise", "雜音"),
        ])
    }

    // =============================================
    // recommend テスト
    // =============================================

    #[test]
    fn test_recommend_primary_match() {
        let catalog = sample_catalog();
        let rec = Recommender::new(&catalog).recommend("Boot failure");
        assert_eq!(rec.candidate1, "E001");
        assert_eq!(rec.candidate1_chinese, "開機失敗");
        assert_eq!(rec.candidate2, "E003");
    }

    #[test]
    fn test_recommend_no_match_is_empty() {
        let catalog = sample_catalog();
        let rec = Recommender::new(&catalog).recommend("Random text xyz");
        assert_eq!(rec, Recommendation::default());
    }

    #[test]
    fn test_recommend_case_insensitive() {
        let catalog = sample_catalog();
        let recommender = Recommender::new(&catalog);
        assert_eq!(recommender.recommend("PC Fail"), recommender.recommend("pc fail"));
    }

    #[test]
    fn test_recommend_important_keyword() {
        // "pc" は2文字なので通常キーワードにならないが重要語として一致する
        let catalog = sample_catalog();
        let rec = Recommender::new(&catalog).recommend("pc xyz");
        assert_eq!(rec.candidate1, "E001");
        assert!(rec.candidate2.is_empty());
    }

    #[test]
    fn test_recommend_fallback_all_columns() {
        let table = crate::table::Table::new(
            crate::schema::CANONICAL_CATALOG_COLUMNS.iter().map(|s| s.to_string()).collect(),
            vec![
                vec!["Audio".into(), "RCA L".into(), "AFFY001".into(), "Left silent".into(), "左聲道無聲".into(), "".into(), "".into(), "".into()],
                vec!["Video".into(), "HDMI".into(), "VDHD001".into(), "No signal".into(), "無訊號".into(), "".into(), "".into(), "".into()],
            ],
        );
        let catalog = Catalog::from_table(table).unwrap();
        let rec = Recommender::new(&catalog).recommend("hdmi");
        assert_eq!(rec.candidate1, "VDHD001");
    }

    #[test]
    fn test_recommend_chinese_description() {
        let catalog = sample_catalog();
        let rec = Recommender::new(&catalog).recommend("雜音");
        assert_eq!(rec.candidate1, "E004");
    }

    #[test]
    fn test_at_most_two_distinct_candidates() {
        let catalog = Catalog::from_pairs(&[
            ("E001", "boot a", ""),
            ("E001", "boot b", ""),
            ("E002", "boot c", ""),
            ("E003", "boot d", ""),
        ]);
        let rec = Recommender::new(&catalog).recommend("boot");
        assert_eq!(rec.candidate1, "E001");
        assert_eq!(rec.candidate2, "E002");
        assert_eq!(rec.candidate_count(), 2);
    }

    #[test]
    fn test_by_score_ranking() {
        let catalog = Catalog::from_pairs(&[
            ("E010", "fan noise", ""),
            ("E011", "fan speed low noise", ""),
            ("E012", "speed", ""),
        ]);
        let scan = Recommender::new(&catalog).recommend("fan speed");
        assert_eq!(scan.candidate1, "E010");

        let scored = Recommender::new(&catalog)
            .with_policy(RankingPolicy::ByScore)
            .recommend("fan speed");
        assert_eq!(scored.candidate1, "E011");
        assert_eq!(scored.candidate2, "E010");
    }

    // =============================================
    // generate_recommendations_with_search テスト
    // =============================================

    #[test]
    fn test_batch_is_index_aligned() {
        let catalog = sample_catalog();
        let descriptions = vec![
            "Fan speed".to_string(),
            "   ".to_string(),
            "Random text xyz".to_string(),
            "Audio noise".to_string(),
        ];
        let recs = Recommender::new(&catalog).generate_recommendations_with_search(&descriptions);
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[0].candidate1, "E002");
        assert!(recs[1].is_empty());
        assert!(recs[2].is_empty());
        assert_eq!(recs[3].candidate1, "E004");
    }

    #[test]
    fn test_batch_empty_catalog() {
        let catalog = Catalog::default();
        let descriptions = vec!["PC fail".to_string(), "boot".to_string()];
        let recs = Recommender::new(&catalog).generate_recommendations_with_search(&descriptions);
        assert_eq!(recs, vec![Recommendation::default(); 2]);
    }

    #[test]
    fn test_batch_empty_input() {
        let catalog = sample_catalog();
        let recs = Recommender::new(&catalog).generate_recommendations_with_search(&[]);
        assert!(recs.is_empty());
    }

    // =============================================
    // 統計・検証テスト
    // =============================================

    #[test]
    fn test_stats() {
        let recs = vec![
            Recommendation::from_candidates(&[("A".into(), String::new()), ("B".into(), String::new())]),
            Recommendation::from_candidates(&[("C".into(), String::new())]),
            Recommendation::default(),
            Recommendation::default(),
        ];
        let stats = RecommendationStats::from(recs.as_slice());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.valid_first, 2);
        assert_eq!(stats.valid_second, 1);
        assert_eq!(stats.both_valid, 1);
        assert!((stats.first_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty() {
        let empty: Vec<Recommendation> = Vec::new();
        let stats = RecommendationStats::from(empty.as_slice());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.first_rate, 0.0);
    }

    #[test]
    fn test_validate() {
        let full = Recommendation::from_candidates(&[("A".into(), String::new())]);
        assert!(validate_recommendations(&[full.clone(), Recommendation::default()], 2));
        assert!(!validate_recommendations(&[full.clone()], 2));
        assert!(!validate_recommendations(
            &[full, Recommendation::default(), Recommendation::default()],
            3
        ));
    }

    #[test]
    fn test_ranking_policy_parse() {
        assert_eq!("by-score".parse::<RankingPolicy>(), Ok(RankingPolicy::ByScore));
        assert_eq!(" Scan-Order ".parse::<RankingPolicy>(), Ok(RankingPolicy::ScanOrder));
        assert!("random".parse::<RankingPolicy>().is_err());
        assert_eq!(RankingPolicy::ByScore.to_string(), "by-score");
    }
}
