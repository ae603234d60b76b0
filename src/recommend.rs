//! 推薦の一括実行
//!
//! - 検索モード: カタログをキーワード検索（rayon で並列、順序は保持）
//! - 解析テキストモード: 外部で生成した推薦テキストを解析

use crate::error::{CompareError, Result};
use errorcode_common::{
    align_recommendations, parse_recommendations, Alignment, Catalog, RankingPolicy,
    Recommendation, Recommender,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

/// 説明文ごとにカタログ検索で推薦を作る（入力と同じ長さ・順序）
pub fn recommend_with_search(
    catalog: &Catalog,
    policy: RankingPolicy,
    descriptions: &[String],
    show_progress: bool,
) -> Vec<Recommendation> {
    let recommender = Recommender::new(catalog).with_policy(policy);
    if catalog.is_empty() {
        return recommender.generate_recommendations_with_search(descriptions);
    }

    let pb = if show_progress {
        ProgressBar::new(descriptions.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_message("推薦中");

    let recommendations: Vec<Recommendation> = descriptions
        .par_iter()
        .map(|description| {
            let rec = recommender.recommend(description);
            pb.inc(1);
            rec
        })
        .collect();

    pb.finish_and_clear();
    info!(
        "推薦完了: {}件 (方針: {})",
        recommendations.len(),
        recommender.policy()
    );
    recommendations
}

/// 外部解析テキストから推薦を作る（カタログがあれば中文説明を補完）
pub fn recommend_from_response(
    response: &str,
    catalog: Option<&Catalog>,
) -> Result<Vec<Recommendation>> {
    let recommendations = parse_recommendations(response, catalog.map(|c| c.index()))?;
    info!("解析テキストから{}件の推薦を読み取りました", recommendations.len());
    Ok(recommendations)
}

/// 推薦件数を行数に揃える
///
/// 不足時は空の推薦で補い、`RecommendationUnderflow` を警告値として返す。
/// 余剰は切り捨てて警告ログのみ。
pub fn align_to_rows(
    recommendations: Vec<Recommendation>,
    expected: usize,
) -> (Vec<Recommendation>, Option<CompareError>) {
    let (aligned, alignment) = align_recommendations(recommendations, expected);
    let warning = match alignment {
        Alignment::Exact => None,
        Alignment::Padded { expected, actual } => {
            let w = CompareError::RecommendationUnderflow { expected, actual };
            warn!("{} (空の推薦で補完)", w);
            Some(w)
        }
        Alignment::Truncated { expected, actual } => {
            warn!("推薦件数が多すぎます: 期待 {} 件, 実際 {} 件 (切り捨て)", expected, actual);
            None
        }
    };
    (aligned, warning)
}
