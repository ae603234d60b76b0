//! 照合サービス
//!
//! 読み込み → 照合 → 推薦 → 保存 の一連の処理をまとめる。
//! 出力ロックは `Comparer` ごとに持つ（グローバル状態なし）。

use crate::config::Config;
use crate::error::{CompareError, Result};
use crate::export::excel::{annotate_existing_report, build_report, write_report, AnnotateOutcome};
use crate::export::{output_path_for, WriteLocks};
use crate::loader::{load_catalog, load_source_sheet, CatalogOptions, SourceSheet};
use crate::recommend::{align_to_rows, recommend_from_response, recommend_with_search};
use errorcode_common::{
    reconcile, source_records, validate_recommendations, Catalog, HeaderStrategy, NotFoundText,
    RankingPolicy, Recommendation, RecommendationStats, SourceRecord,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 照合処理の設定（Config から作る）
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub catalog: CatalogOptions,
    pub header_anchor: String,
    pub not_found: NotFoundText,
    pub ranking_policy: RankingPolicy,
    pub show_progress: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            catalog: CatalogOptions::default(),
            header_anchor: "Main Function".into(),
            not_found: NotFoundText::default(),
            ranking_policy: RankingPolicy::default(),
            show_progress: false,
        }
    }
}

impl CompareOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            catalog: CatalogOptions {
                sheet: config.catalog_sheet().to_string(),
                skip_rows: config.catalog_skip_rows()?,
                encodings: config.catalog_encodings(),
            },
            header_anchor: config.header_anchor().to_string(),
            not_found: config.not_found_text(),
            ranking_policy: config.ranking_policy()?,
            show_progress: false,
        })
    }
}

/// 推薦の作り方
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecommendMode {
    #[default]
    None,
    /// カタログのキーワード検索
    Search,
    /// 外部解析テキスト
    Response(String),
}

/// 照合の依頼内容
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub source_path: PathBuf,
    pub sheet: String,
    pub catalog_path: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: RecommendMode,
}

/// 照合結果の概要
#[derive(Debug)]
pub struct CompareSummary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub found: usize,
    pub header_strategy: HeaderStrategy,
    pub duplicate_codes: usize,
    pub stats: Option<RecommendationStats>,
    /// 推薦件数の補完が起きた場合の警告
    pub warning: Option<CompareError>,
}

impl CompareSummary {
    pub fn not_found(&self) -> usize {
        self.rows - self.found
    }
}

#[derive(Debug, Clone, Default)]
pub struct Comparer {
    options: CompareOptions,
    locks: WriteLocks,
}

impl Comparer {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            options,
            locks: WriteLocks::new(),
        }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    pub fn locks(&self) -> &WriteLocks {
        &self.locks
    }

    pub fn load_catalog(&self, path: &Path) -> Result<Catalog> {
        load_catalog(path, &self.options.catalog)
    }

    /// 来源シートを読み、SourceRecord に変換
    pub fn load_source(&self, path: &Path, sheet: &str) -> Result<(SourceSheet, Vec<SourceRecord>)> {
        let source = load_source_sheet(
            path,
            sheet,
            &self.options.header_anchor,
            &self.options.catalog.encodings,
        )?;
        let records = source_records(&source.table).map_err(|e| {
            error!("来源シートの列を特定できません: {}: {}", path.display(), e);
            CompareError::from(e)
        })?;
        Ok((source, records))
    }

    /// 推薦を作り、行数に揃える（`RecommendMode::None` なら None）
    ///
    /// 解析テキストが読めない場合は空の推薦で補い、照合は止めない。
    /// 説明文が空の行は常に空の推薦になる。
    pub fn recommend(
        &self,
        catalog: &Catalog,
        records: &[SourceRecord],
        mode: &RecommendMode,
    ) -> Result<Option<(Vec<Recommendation>, Option<CompareError>)>> {
        let recommendations = match mode {
            RecommendMode::None => return Ok(None),
            RecommendMode::Search => {
                let descriptions: Vec<String> =
                    records.iter().map(|r| r.description.clone()).collect();
                recommend_with_search(
                    catalog,
                    self.options.ranking_policy,
                    &descriptions,
                    self.options.show_progress,
                )
            }
            RecommendMode::Response(text) => match recommend_from_response(text, Some(catalog)) {
                Ok(recs) => recs,
                Err(e) => {
                    warn!("解析テキストから推薦を読み取れません（空の推薦で続行）: {}", e);
                    Vec::new()
                }
            },
        };
        let (mut aligned, warning) = align_to_rows(recommendations, records.len());
        for (rec, record) in aligned.iter_mut().zip(records) {
            if record.description.trim().is_empty() {
                *rec = Recommendation::default();
            }
        }
        Ok(Some((aligned, warning)))
    }

    /// 照合してレポートを書き出す
    pub fn compare(&self, request: &CompareRequest) -> Result<CompareSummary> {
        let catalog = self.load_catalog(&request.catalog_path)?;
        let (source, records) = self.load_source(&request.source_path, &request.sheet)?;

        let results = reconcile(&records, catalog.index(), &self.options.not_found);
        let found = results.iter().filter(|r| r.found).count();
        info!("照合完了: {}行中 {}行一致", results.len(), found);

        let (recommendations, warning) = match self.recommend(&catalog, &records, &request.mode)? {
            Some((recs, warning)) => (Some(recs), warning),
            None => (None, None),
        };
        if let Some(recs) = recommendations.as_deref() {
            // 不一致や空行過多は警告ログのみ
            validate_recommendations(recs, records.len());
        }
        let stats = recommendations.as_deref().map(RecommendationStats::from);

        let report = build_report(
            &source.sheet_name,
            &results,
            recommendations.as_deref(),
            &catalog,
            &self.options.catalog.sheet,
        );
        let output = output_path_for(&request.source_path, request.output.as_deref());
        let output_path = write_report(&self.locks, &report, &output)?;

        Ok(CompareSummary {
            output_path,
            rows: results.len(),
            found,
            header_strategy: source.header_strategy,
            duplicate_codes: catalog.duplicate_codes(),
            stats,
            warning,
        })
    }

    /// 既存レポートに推薦列を追記
    pub fn annotate(&self, report_path: &Path, recommendations: Vec<Recommendation>) -> Result<AnnotateOutcome> {
        annotate_existing_report(
            &self.locks,
            report_path,
            recommendations,
            &self.options.catalog.sheet,
        )
    }
}
