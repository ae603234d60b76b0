//! 設定ファイル（setup.txt）
//!
//! `key=value` 形式の行指向テキスト。書き戻し時にコメント行・空行・
//! 未知のキーはそのまま残し、値が変わった行だけをその場で更新する。

use crate::error::{CompareError, Result};
use errorcode_common::{NotFoundText, RankingPolicy};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SETUP_FILE_NAME: &str = "setup.txt";

pub const KEY_NOT_FOUND: &str = "NotFound";
pub const KEY_NOT_FOUND_CN: &str = "NotFoundCN";
pub const KEY_CATALOG_SHEET: &str = "CatalogSheet";
pub const KEY_CATALOG_SKIP_ROWS: &str = "CatalogSkipRows";
pub const KEY_CATALOG_ENCODINGS: &str = "CatalogEncodings";
pub const KEY_HEADER_ANCHOR: &str = "HeaderAnchor";
pub const KEY_RANKING_POLICY: &str = "RankingPolicy";
pub const KEY_LAST_EXCEL_PATH: &str = "LastExcelPath";
pub const KEY_LAST_XML_PATH: &str = "LastXMLPath";
pub const KEY_LAST_OUTPUT_DIR: &str = "LastOutputDir";

/// 既定値（この順で新規ファイルに書き出す）
pub const DEFAULTS: &[(&str, &str)] = &[
    (KEY_NOT_FOUND, "查無說明"),
    (KEY_NOT_FOUND_CN, "查無中文說明"),
    (KEY_CATALOG_SHEET, "Test Item All"),
    (KEY_CATALOG_SKIP_ROWS, "3"),
    (KEY_CATALOG_ENCODINGS, "utf-8,big5,gbk,cp950,latin1"),
    (KEY_HEADER_ANCHOR, "Main Function"),
    (KEY_RANKING_POLICY, "scan-order"),
    (KEY_LAST_EXCEL_PATH, ""),
    (KEY_LAST_XML_PATH, ""),
    (KEY_LAST_OUTPUT_DIR, ""),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entry { key: String, value: String },
    /// コメント・空行・`=` を含まない行
    Verbatim(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    lines: Vec<Line>,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse(PathBuf::from(SETUP_FILE_NAME), "")
    }
}

impl Config {
    /// 設定ファイルを読み込む（なければ既定値で作成）
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit)?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config = Self::parse(path, &content);
            debug!("設定ファイルを読み込みました: {}", config.path.display());
            Ok(config)
        } else {
            let config = Self::parse(path, "");
            config.save()?;
            info!("設定ファイルを作成しました: {}", config.path.display());
            Ok(config)
        }
    }

    /// 設定ファイルの場所を決める
    ///
    /// 優先順位:
    /// 1. `--setup` で指定されたパス
    /// 2. カレントディレクトリの setup.txt
    /// 3. ユーザー設定ディレクトリ/errorcode-compare/setup.txt
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let local = PathBuf::from(SETUP_FILE_NAME);
        if local.exists() {
            return Ok(local);
        }
        let dir = dirs::config_dir()
            .ok_or_else(|| CompareError::Config("設定ディレクトリが見つかりません".into()))?;
        Ok(dir.join("errorcode-compare").join(SETUP_FILE_NAME))
    }

    /// テキストを解析し、足りないキーを既定値で補う
    pub fn parse(path: PathBuf, content: &str) -> Self {
        let mut lines: Vec<Line> = content
            .lines()
            .map(|raw| {
                let trimmed = raw.trim_start();
                if trimmed.starts_with('#') || !raw.contains('=') {
                    return Line::Verbatim(raw.to_string());
                }
                let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
                Line::Entry {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                }
            })
            .collect();

        for (key, value) in DEFAULTS {
            let present = lines
                .iter()
                .any(|l| matches!(l, Line::Entry { key: k, .. } if k == key));
            if !present {
                lines.push(Line::Entry {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Self { path, lines }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイル形式のテキストに戻す
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            match line {
                Line::Entry { key, value } => {
                    text.push_str(key);
                    text.push('=');
                    text.push_str(value);
                }
                Line::Verbatim(raw) => text.push_str(raw),
            }
            text.push('\n');
        }
        text
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, self.to_text())?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|l| match l {
            Line::Entry { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// 値を更新（既存行はその場で、新しいキーは末尾に追加）
    pub fn set(&mut self, key: &str, value: &str) {
        for line in self.lines.iter_mut() {
            if let Line::Entry { key: k, value: v } = line {
                if k == key {
                    *v = value.to_string();
                    return;
                }
            }
        }
        self.lines.push(Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// 全エントリ（ファイル内の順）
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Entry { key, value } => Some((key.as_str(), value.as_str())),
                Line::Verbatim(_) => None,
            })
            .collect()
    }

    fn get_or_default(&self, key: &str) -> &str {
        self.get(key)
            .or_else(|| DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v))
            .unwrap_or("")
    }

    pub fn not_found(&self) -> &str {
        self.get_or_default(KEY_NOT_FOUND)
    }

    pub fn not_found_cn(&self) -> &str {
        self.get_or_default(KEY_NOT_FOUND_CN)
    }

    pub fn not_found_text(&self) -> NotFoundText {
        NotFoundText {
            description: self.not_found().to_string(),
            chinese: self.not_found_cn().to_string(),
        }
    }

    pub fn catalog_sheet(&self) -> &str {
        self.get_or_default(KEY_CATALOG_SHEET)
    }

    pub fn catalog_skip_rows(&self) -> Result<usize> {
        let raw = self.get_or_default(KEY_CATALOG_SKIP_ROWS);
        raw.trim().parse().map_err(|_| {
            CompareError::Config(format!("{} が数値ではありません: {}", KEY_CATALOG_SKIP_ROWS, raw))
        })
    }

    /// 文字コード候補（カンマ区切り、空要素は除く）
    pub fn catalog_encodings(&self) -> Vec<String> {
        self.get_or_default(KEY_CATALOG_ENCODINGS)
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn header_anchor(&self) -> &str {
        self.get_or_default(KEY_HEADER_ANCHOR)
    }

    pub fn ranking_policy(&self) -> Result<RankingPolicy> {
        self.get_or_default(KEY_RANKING_POLICY)
            .parse()
            .map_err(CompareError::Config)
    }

    /// 最後に使ったパスを記録（None の項目は変更しない）
    pub fn update_last_paths(
        &mut self,
        excel_path: Option<&Path>,
        catalog_path: Option<&Path>,
        output_dir: Option<&Path>,
    ) {
        if let Some(p) = excel_path {
            self.set(KEY_LAST_EXCEL_PATH, &p.display().to_string());
        }
        if let Some(p) = catalog_path {
            self.set(KEY_LAST_XML_PATH, &p.display().to_string());
        }
        if let Some(p) = output_dir {
            self.set(KEY_LAST_OUTPUT_DIR, &p.display().to_string());
        }
    }
}
