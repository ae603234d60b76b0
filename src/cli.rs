use clap::{Parser, Subcommand};
use errorcode_common::{PromptKind, RankingPolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "errcode")]
#[command(about = "エラーコード照合・推薦レポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ./setup.txt）
    #[arg(long, global = true)]
    pub setup: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 来源シートをカタログと照合してレポートを出力
    Compare {
        /// 来源ファイル（xlsx/csv）
        #[arg(required = true)]
        source: PathBuf,

        /// カタログファイル（xlsx/csv/tsv/txt）
        #[arg(short, long)]
        catalog: PathBuf,

        /// 来源シート名（省略時は選択または先頭シート）
        #[arg(short, long)]
        sheet: Option<String>,

        /// 出力ファイル/ディレクトリ（デフォルト: 来源ファイルの隣）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キーワード検索で推薦列を追加
        #[arg(short, long, conflicts_with = "ai_response")]
        recommend: bool,

        /// 外部AIの応答テキストから推薦列を追加
        #[arg(long)]
        ai_response: Option<PathBuf>,

        /// 候補の並び順 (scan-order/by-score)
        #[arg(long)]
        ranking: Option<RankingPolicy>,
    },

    /// 推薦を計算（既存レポートへ追記、またはJSON出力）
    Recommend {
        /// 来源ファイル
        #[arg(required = true)]
        source: PathBuf,

        /// カタログファイル
        #[arg(short, long)]
        catalog: PathBuf,

        /// 来源シート名
        #[arg(short, long)]
        sheet: Option<String>,

        /// 追記する既存レポート（省略時はJSONを標準出力へ）
        #[arg(long)]
        report: Option<PathBuf>,

        /// 外部AIの応答テキスト（省略時はキーワード検索）
        #[arg(long)]
        ai_response: Option<PathBuf>,

        /// 候補の並び順 (scan-order/by-score)
        #[arg(long)]
        ranking: Option<RankingPolicy>,
    },

    /// 外部AI向けのプロンプトを出力
    Prompt {
        /// 来源ファイル
        #[arg(required = true)]
        source: PathBuf,

        /// 参照カタログのパス（プロンプトに記載）
        #[arg(short, long)]
        catalog: PathBuf,

        /// 来源シート名
        #[arg(short, long)]
        sheet: Option<String>,

        /// 種類 (basic/single/batch/excel)
        #[arg(short, long, default_value = "basic")]
        kind: PromptKind,

        /// エラー処理の指示を追記
        #[arg(long)]
        error_handling: bool,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// カタログを検索（全語を含む行、最大3語）
    Search {
        /// カタログファイル
        #[arg(short, long)]
        catalog: PathBuf,

        /// 検索語
        #[arg(num_args = 0..=3)]
        queries: Vec<String>,
    },

    /// ワークブックのシート名一覧
    Sheets {
        /// ワークブック
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 比較レポートを検索
    Reports {
        /// 検索ディレクトリ（デフォルト: . EXCEL dist output）
        dirs: Vec<PathBuf>,

        /// 最新の1件のみ表示
        #[arg(long)]
        latest: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 設定の表示・変更
    Config {
        /// KEY=VALUE 形式で設定
        #[arg(long)]
        set: Vec<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
