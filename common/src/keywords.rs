//! キーワード抽出
//!
//! 説明文から検索用キーワードを最大3件取り出す。
//! 3段階で試し、前の段階で1件も取れなかった場合のみ次へ進む。

use lazy_static::lazy_static;
use regex::Regex;

/// 保持するキーワードの上限
pub const MAX_KEYWORDS: usize = 3;

/// 除外する英語の機能語・代名詞
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "can", "must", "shall", "this",
    "that", "these", "those", "i", "you", "he", "she", "it", "we", "they",
];

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s#-]").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[#\-_]+").unwrap();
}

const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', '(', ')', '[', ']', '{', '}'];

/// 抽出に成功した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordTier {
    /// 3文字以上の単語
    Long,
    /// 2文字以上の単語
    Short,
    /// `#` `-` `_` 区切りの断片
    Fragments,
}

/// 説明文からキーワードを抽出（空なら空Vec）
pub fn extract_keywords(description: &str) -> Vec<String> {
    extract_keywords_with_tier(description)
        .map(|(keywords, _)| keywords)
        .unwrap_or_default()
}

/// キーワードと採用した段階を返す
pub fn extract_keywords_with_tier(description: &str) -> Option<(Vec<String>, KeywordTier)> {
    if description.trim().is_empty() {
        return None;
    }

    let words = tokenize(description);

    let long = filter_words(&words, 2);
    if !long.is_empty() {
        return Some((long, KeywordTier::Long));
    }

    let short = filter_words(&words, 1);
    if !short.is_empty() {
        return Some((short, KeywordTier::Short));
    }

    let lowered = description.to_lowercase();
    let fragments: Vec<String> = SEPARATORS
        .split(&lowered)
        .map(|f| f.trim())
        .filter(|f| f.chars().count() > 1)
        .take(MAX_KEYWORDS)
        .map(|f| f.to_string())
        .collect();
    if !fragments.is_empty() {
        return Some((fragments, KeywordTier::Fragments));
    }

    None
}

fn tokenize(description: &str) -> Vec<String> {
    let cleaned = NON_WORD.replace_all(description, " ").to_lowercase();
    cleaned
        .split_whitespace()
        .map(|w| w.trim_matches(EDGE_PUNCTUATION).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

fn filter_words(words: &[String], min_exclusive: usize) -> Vec<String> {
    words
        .iter()
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| w.chars().count() > min_exclusive)
        .take(MAX_KEYWORDS)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        assert_eq!(extract_keywords("Check boot fail"), vec!["check", "boot", "fail"]);
    }

    #[test]
    fn test_extract_caps_at_three() {
        let keywords = extract_keywords("Audio left channel noise level check");
        assert_eq!(keywords, vec!["audio", "left", "channel"]);
    }

    #[test]
    fn test_stop_words_removed() {
        assert_eq!(extract_keywords("Check the fan of it"), vec!["check", "fan"]);
    }

    #[test]
    fn test_punctuation_replaced() {
        assert_eq!(extract_keywords("USB(3.0): read/write"), vec!["usb", "read", "write"]);
    }

    #[test]
    fn test_hash_and_dash_kept_in_words() {
        assert_eq!(extract_keywords("Port#2 self-test"), vec!["port#2", "self-test"]);
    }

    #[test]
    fn test_short_tier() {
        let (keywords, tier) = extract_keywords_with_tier("PC on").unwrap();
        assert_eq!(keywords, vec!["pc"]);
        assert_eq!(tier, KeywordTier::Short);
    }

    #[test]
    fn test_fragment_tier() {
        // 機能語だけの説明は区切り文字で分割した断片を使う
        let (keywords, tier) = extract_keywords_with_tier("The it").unwrap();
        assert_eq!(keywords, vec!["the it"]);
        assert_eq!(tier, KeywordTier::Fragments);

        assert!(extract_keywords_with_tier("x").is_none());
    }

    #[test]
    fn test_chinese_words_kept() {
        assert_eq!(extract_keywords("開機失敗"), vec!["開機失敗"]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   \t").is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(extract_keywords("PC Fail"), extract_keywords("pc fail"));
    }
}
