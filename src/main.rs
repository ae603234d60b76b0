use anyhow::{bail, Context, Result};
use clap::Parser;
use errorcode_common::{build_prompt, prompts::build_error_handling_prompt};
use errorcode_compare::{cli, config, finder, loader, sheet_selector};
use errorcode_compare::{CompareOptions, CompareRequest, Comparer, RecommendMode};
use cli::{Cli, Commands};
use config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_response(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("応答テキストを読み込めません: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.setup.as_deref()).context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Compare { source, catalog, sheet, output, recommend, ai_response, ranking } => {
            println!("📊 errcode - エラーコード照合\n");

            let mut options = CompareOptions::from_config(&config)?;
            options.show_progress = true;
            if let Some(policy) = ranking {
                options.ranking_policy = policy;
            }

            let mode = match (&ai_response, recommend) {
                (Some(path), _) => RecommendMode::Response(read_response(path)?),
                (None, true) => RecommendMode::Search,
                (None, false) => RecommendMode::None,
            };

            let sheet = sheet_selector::resolve_sheet(&source, sheet.as_deref())?;
            println!("[1/2] 照合中... (シート: {})", sheet);

            let comparer = Comparer::new(options);
            let request = CompareRequest {
                source_path: source.clone(),
                sheet,
                catalog_path: catalog.clone(),
                output,
                mode,
            };
            let summary = tokio::task::spawn_blocking(move || comparer.compare(&request))
                .await
                .context("照合処理が異常終了しました")??;

            println!(
                "✔ {}行を照合 (一致 {} / 不一致 {}, ヘッダー: {})",
                summary.rows,
                summary.found,
                summary.not_found(),
                summary.header_strategy
            );
            if summary.duplicate_codes > 0 {
                println!("⚠ カタログに重複コードが {} 件あります（先頭行を採用）", summary.duplicate_codes);
            }
            if let Some(stats) = &summary.stats {
                println!(
                    "✔ 推薦: 候補1 {}/{} ({:.0}%), 2候補 {}/{} ({:.0}%)",
                    stats.valid_first,
                    stats.total,
                    stats.first_rate * 100.0,
                    stats.both_valid,
                    stats.total,
                    stats.both_valid_rate * 100.0
                );
            }
            if let Some(warning) = &summary.warning {
                println!("⚠ {}", warning);
            }

            println!("\n[2/2] 設定を保存中...");
            config.update_last_paths(Some(source.as_path()), Some(catalog.as_path()), summary.output_path.parent());
            config.save()?;

            println!("✔ 出力: {}", summary.output_path.display());
            println!("\n✅ 完了");
        }

        Commands::Recommend { source, catalog, sheet, report, ai_response, ranking } => {
            let mut options = CompareOptions::from_config(&config)?;
            options.show_progress = report.is_some();
            if let Some(policy) = ranking {
                options.ranking_policy = policy;
            }
            let comparer = Comparer::new(options);

            let sheet = sheet_selector::resolve_sheet(&source, sheet.as_deref())?;
            let catalog_data = comparer.load_catalog(&catalog)?;
            let (_, records) = comparer.load_source(&source, &sheet)?;

            let mode = match &ai_response {
                Some(path) => RecommendMode::Response(read_response(path)?),
                None => RecommendMode::Search,
            };
            let (recommendations, warning) = comparer
                .recommend(&catalog_data, &records, &mode)?
                .unwrap_or_default();

            match report {
                Some(report_path) => {
                    println!("📝 errcode - 推薦列の追記\n");
                    let outcome = comparer.annotate(&report_path, recommendations)?;
                    if let Some(w) = warning.or(outcome.warning) {
                        println!("⚠ {}", w);
                    }
                    println!("✔ {}行に推薦列を追記: {}", outcome.rows, outcome.path.display());
                    println!("\n✅ 完了");
                }
                None => {
                    if let Some(w) = warning {
                        eprintln!("⚠ {}", w);
                    }
                    println!("{}", serde_json::to_string_pretty(&recommendations)?);
                }
            }
        }

        Commands::Prompt { source, catalog, sheet, kind, error_handling, output } => {
            let comparer = Comparer::new(CompareOptions::from_config(&config)?);
            let sheet = sheet_selector::resolve_sheet(&source, sheet.as_deref())?;
            let (_, records) = comparer.load_source(&source, &sheet)?;

            // 空行も番号を保ち、応答を来源シートの行順に戻せるようにする
            let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
            let filled = descriptions.iter().filter(|d| !d.trim().is_empty()).count();
            if filled == 0 {
                bail!("説明文が1件もありません: {}", source.display());
            }

            let mut prompt = build_prompt(kind, &descriptions, &catalog.display().to_string());
            if error_handling {
                prompt.push_str(&build_error_handling_prompt());
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, &prompt)?;
                    println!(
                        "✔ プロンプトを出力: {} ({}行, 説明文あり {}件)",
                        path.display(),
                        descriptions.len(),
                        filled
                    );
                }
                None => println!("{}", prompt),
            }
        }

        Commands::Search { catalog, queries } => {
            let comparer = Comparer::new(CompareOptions::from_config(&config)?);
            let catalog_data = comparer.load_catalog(&catalog)?;
            let queries: Vec<&str> = queries.iter().map(|q| q.as_str()).collect();

            let hits = catalog_data.search_all(&queries);
            println!("🔍 {}件ヒット\n", hits.len());
            for entry in hits {
                println!("  {} | {} | {}", entry.code, entry.description, entry.chinese_description);
            }
        }

        Commands::Sheets { file } => {
            for (i, name) in loader::sheet_names(&file)?.iter().enumerate() {
                println!("  {}) {}", i + 1, name);
            }
        }

        Commands::Reports { dirs, latest, json } => {
            let dirs = if dirs.is_empty() { finder::default_search_dirs() } else { dirs };

            let files: Vec<finder::ReportFile> = if latest {
                finder::find_latest_compare_file(&dirs).into_iter().collect()
            } else {
                finder::find_compare_files(&dirs)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&files)?);
                return Ok(());
            }
            if files.is_empty() {
                println!("比較レポートが見つかりません");
            }
            for (line, file) in finder::format_file_list(&files).iter().zip(&files) {
                println!("  {}", line);
                println!("    {}", file.path.display());
            }
        }

        Commands::Config { set, show } => {
            for pair in &set {
                let Some((key, value)) = pair.split_once('=') else {
                    bail!("KEY=VALUE 形式で指定してください: {}", pair);
                };
                config.set(key.trim(), value.trim());
                println!("✔ {} を設定しました", key.trim());
            }
            if !set.is_empty() {
                // 値の妥当性を確認してから保存
                CompareOptions::from_config(&config)?;
                config.save()?;
            }

            if show || set.is_empty() {
                println!("設定: {}", config.path().display());
                for (key, value) in config.entries() {
                    println!("  {} = {}", key, value);
                }
            }
        }
    }

    Ok(())
}
