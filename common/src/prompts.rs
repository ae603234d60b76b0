//! プロンプト生成モジュール
//!
//! 外部AIにTest IDの推薦を依頼するためのプロンプトを組み立てる。
//! 応答は `parser::parse_ai_response` で取り込める形式
//! （`1. [ID1] | [ID2]`）を指定している。
//!
//! カタログ利用者に合わせ、プロンプト本文は繁体字中国語で出力する。

use std::str::FromStr;

/// プロンプトの種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptKind {
    /// 説明文リストの基本分析
    #[default]
    Basic,
    /// 1件だけ詳しく分析（理由と評点付き）
    Single,
    /// 一括分析
    Batch,
    /// 既存の比較レポートへの列追加用
    Excel,
}

impl FromStr for PromptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(PromptKind::Basic),
            "single" => Ok(PromptKind::Single),
            "batch" => Ok(PromptKind::Batch),
            "excel" => Ok(PromptKind::Excel),
            other => Err(format!("不明なプロンプト種別: {}", other)),
        }
    }
}

/// 空の説明文の表示（行番号は来源シートの行順のまま）
pub const BLANK_DESCRIPTION: &str = "(空白)";

/// 応答形式の指定（全種別共通）
const OUTPUT_FORMAT: &str = "1. [Test ID 1] | [Test ID 2]
2. [Test ID 1] | [Test ID 2]
3. [Test ID 1] | [Test ID 2]
...
(空白) 的項目請保留編號並輸出空白，例如: 4. |";

/// 参照カタログの列構成
const CATALOG_LAYOUT: &str = "- Main Function: 功能大類 (例: AFM, Audio, BOARD Measure)
- Interface: 介面 (例: Audio RCA L, Audio Jack R)
- Internal Error Code: 內部錯誤代碼 (例: AFFY001, ADRL001)
- Description: 英文說明
- Chinese: 中文說明
- Version: 版本
- Error Code: 對外錯誤代碼 (BSF 系列, E00 系列)
- Note: 備註";

fn numbered(descriptions: &[&str]) -> String {
    descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let d = if d.trim().is_empty() { BLANK_DESCRIPTION } else { d };
            format!("{}. {}", i + 1, d)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 基本分析プロンプト
pub fn build_basic_prompt(descriptions: &[&str], reference_path: &str) -> String {
    let list = numbered(descriptions);
    format!(
        r#"你是 Error Code 比對助手。請依照下列 Description 清單，在參考資料中為每一筆找出 2 個最合適的 Test ID。

【參考資料】
{reference_path}

【Description 清單】
{list}

【輸出格式】（每筆一行，行數與清單相同）
{OUTPUT_FORMAT}

【評分參考】
- 完全相符: 10/10
- 高度相似: 8-9/10
- 部分相符: 6-7/10
- 功能相關: 4-5/10
- 優先考慮 BSF 系列與 E00 系列

【參考資料欄位】
{CATALOG_LAYOUT}
"#
    )
}

/// 単一説明文の分析プロンプト
pub fn build_single_prompt(description: &str, reference_path: &str) -> String {
    format!(
        r#"請分析下列 Description，並從參考資料推薦 2 個最合適的 Test ID（依相符程度排序）。

【Description】
{description}

【參考資料】
{reference_path}

【分析重點】
1. 理解 Description 的功能與語意
2. 比對功能大類、介面與說明文字
3. 兩個推薦不可重複

【輸出格式】
原始 Description: {description}
推薦 Test ID 1: [代碼] - [分數]/10 - [理由]
推薦 Test ID 2: [代碼] - [分數]/10 - [理由]
"#
    )
}

/// 一括分析プロンプト
pub fn build_batch_prompt(descriptions: &[&str], reference_path: &str) -> String {
    let list = numbered(descriptions);
    format!(
        r#"請對下列 Description 進行批次分析：逐筆理解語意，在 Test Item 資料庫中搜尋，並為每筆推薦 2 個 Test ID。

【Description 清單】
{list}

【參考資料】
{reference_path}

【輸出格式】（每筆一行，順序與清單相同）
{OUTPUT_FORMAT}

【注意事項】
- 先比對功能大類，再比對說明文字
- 同時參考英文與中文說明
- 找不到完全相符時，提供最接近的項目
"#
    )
}

/// 比較レポート（*_compare_ERRORCODE.xlsx）への列追加用プロンプト
pub fn build_excel_prompt(descriptions: &[&str], reference_path: &str) -> String {
    let list = numbered(descriptions);
    format!(
        r#"請為現有的比對結果檔案補上 AI 推薦欄位。

【現有檔案】
- 檔名: XXX_compare_ERRORCODE.xlsx
- 既有欄位: Your Description, Your Error Code, Catalog Description, Catalog Chinese
- 新增欄位: AI-recommended ID 1, AI-recommended ID 2

【Description 清單】
{list}

【參考資料】
{reference_path}

【輸出格式】（只輸出可直接填入的 Test ID，每筆一行）
{OUTPUT_FORMAT}

【優先順序】
1. 完全相符
2. 功能相似
3. 語意相關
"#
    )
}

/// 推薦できない場合の対応を指示する追記
pub fn build_error_handling_prompt() -> String {
    r#"
若找不到合適的 Test ID：
1. 仍提供最接近的 2 個選項
2. 在行尾以括號註明相符程度偏低
3. 建議確認 Description 是否完整
4. 提供可能相關的功能大類

格式:
1. [最接近的 Test ID 1] | [最接近的 Test ID 2] (相符度低)
"#
    .to_string()
}

/// 種別に応じたプロンプトを生成
///
/// `Single` の場合は空でない先頭の説明文だけを使う。
pub fn build_prompt(kind: PromptKind, descriptions: &[&str], reference_path: &str) -> String {
    match kind {
        PromptKind::Basic => build_basic_prompt(descriptions, reference_path),
        PromptKind::Single => {
            let first = descriptions
                .iter()
                .copied()
                .find(|d| !d.trim().is_empty())
                .unwrap_or("");
            build_single_prompt(first, reference_path)
        }
        PromptKind::Batch => build_batch_prompt(descriptions, reference_path),
        PromptKind::Excel => build_excel_prompt(descriptions, reference_path),
    }
}
