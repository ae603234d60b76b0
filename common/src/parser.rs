//! AI応答パーサー
//!
//! 外部AIが返した推薦テキストから Test ID の組を取り出す。
//!
//! 対応する行形式:
//! - `1. [E001] | [E002]`（区切り `|`、括弧は除去）
//! - `2) E001 | E002`
//! - `3. [E001] [E002] ...`（区切りなし、角括弧の先頭2つ）
//! - `4. |`、`4.`、`4. (空白)`（空の説明文の行。空の組として行番号を保つ）
//!
//! 数字で始まらない行は無視する。

use crate::catalog::CatalogIndex;
use crate::error::{Error, Result};
use crate::prompts::BLANK_DESCRIPTION;
use crate::types::Recommendation;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_NUMBER: Regex = Regex::new(r"^\d+\s*[.)]\s*").unwrap();
    static ref BRACKETED: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
}

/// 応答テキストから (ID1, ID2) の組を行順に取り出す
///
/// # Examples
/// ```
/// use errorcode_common::parse_ai_response;
///
/// let pairs = parse_ai_response("1. [E001] | [E002]\nnote\n2) BSF01 | BSF02");
/// assert_eq!(pairs[0], ("E001".to_string(), "E002".to_string()));
/// assert_eq!(pairs[1], ("BSF01".to_string(), "BSF02".to_string()));
/// ```
pub fn parse_ai_response(response: &str) -> Vec<(String, String)> {
    response.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let body = LINE_NUMBER.replace(line, "");
    let rest = body.trim();
    if rest.is_empty() || rest == BLANK_DESCRIPTION {
        return Some((String::new(), String::new()));
    }

    if body.contains('|') {
        let mut parts = body.split('|');
        let first = clean_id(parts.next()?);
        let second = clean_id(parts.next()?);
        return Some((first, second));
    }

    let mut ids = BRACKETED.captures_iter(&body).map(|c| c[1].trim().to_string());
    let first = ids.next()?;
    let second = ids.next()?;
    Some((first, second))
}

/// 角括弧があれば中身、なければ前後空白を除いた文字列
fn clean_id(part: &str) -> String {
    match BRACKETED.captures(part) {
        Some(caps) => caps[1].trim().to_string(),
        None => part.trim().to_string(),
    }
}

/// 取り出した組を推薦に変換
///
/// 索引があれば中文説明を完全一致で補完し、なければ空のまま。
pub fn to_recommendations(
    pairs: &[(String, String)],
    index: Option<&CatalogIndex>,
) -> Vec<Recommendation> {
    let chinese_of = |code: &str| {
        index
            .and_then(|idx| idx.get(code))
            .map(|(_, chinese)| chinese.clone())
            .unwrap_or_default()
    };
    pairs
        .iter()
        .map(|(first, second)| Recommendation {
            candidate1: first.clone(),
            candidate2: second.clone(),
            candidate1_chinese: chinese_of(first),
            candidate2_chinese: chinese_of(second),
        })
        .collect()
}

/// 応答テキストを推薦リストに変換（1行も取り出せなければエラー）
pub fn parse_recommendations(
    response: &str,
    index: Option<&CatalogIndex>,
) -> Result<Vec<Recommendation>> {
    let pairs = parse_ai_response(response);
    if pairs.is_empty() {
        return Err(Error::Parse("推薦行が見つかりません".into()));
    }
    Ok(to_recommendations(&pairs, index))
}
