//! 比較レポートの検索

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// 既定の検索ディレクトリ
pub const DEFAULT_SEARCH_DIRS: &[&str] = &[".", "EXCEL", "dist", "output"];

const REPORT_FILE_SUFFIX: &str = "compare_ERRORCODE.xlsx";

/// 見つかったレポート
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

fn is_report_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(REPORT_FILE_SUFFIX))
        .unwrap_or(false)
}

/// ディレクトリを再帰的に探し、`*compare_ERRORCODE.xlsx` を集める
///
/// 存在しないディレクトリは無視。同じ実体は1件にまとめ、パス順に並べる。
pub fn find_compare_files(dirs: &[PathBuf]) -> Vec<ReportFile> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !is_report_file(path) {
                continue;
            }
            let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if !seen.insert(key) {
                continue;
            }
            let metadata = entry.metadata().ok();
            files.push(ReportFile {
                path: path.to_path_buf(),
                size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: metadata.and_then(|m| m.modified().ok()),
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// 最も新しいレポート
pub fn find_latest_compare_file(dirs: &[PathBuf]) -> Option<ReportFile> {
    find_compare_files(dirs)
        .into_iter()
        .max_by_key(|f| f.modified.unwrap_or(SystemTime::UNIX_EPOCH))
}

/// 既定の検索ディレクトリ一覧
pub fn default_search_dirs() -> Vec<PathBuf> {
    DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect()
}

fn format_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{} B", size)
    }
}

/// `name (size, YYYY-MM-DD HH:MM)` の一覧表示
pub fn format_file_list(files: &[ReportFile]) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            let name = f
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let time = f
                .modified
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{} ({}, {})", name, format_size(f.size), time)
        })
        .collect()
}
