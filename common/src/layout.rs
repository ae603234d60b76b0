//! レポートのレイアウト定義
//!
//! 比較レポートの書式定数と列幅の計算。
//! 列幅はセル内容の最大表示幅から求め、全角文字は半角1.7文字分として数える。

/// 本文フォント
pub const FONT_NAME: &str = "Calibri";
pub const FONT_SIZE: f64 = 11.0;

/// ヘッダー行の塗りつぶし色
pub const HEADER_FILL_RGB: u32 = 0x00C853;
/// カタログシートで照合済みコードの行に付ける色
pub const HIGHLIGHT_FILL_RGB: u32 = 0xB9F6CA;
/// 罫線色
pub const BORDER_RGB: u32 = 0x000000;

pub const MIN_COLUMN_WIDTH: f64 = 12.0;
pub const MAX_COLUMN_WIDTH: f64 = 50.0;
pub const COLUMN_PADDING: f64 = 2.0;
/// 全角文字1文字あたりの幅
pub const WIDE_CHAR_FACTOR: f64 = 1.7;

/// 全角扱いの文字か（CJK漢字・かな・ハングル・全角記号）
pub fn is_wide_char(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303F
        | 0x3040..=0x30FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7AF
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
    )
}

/// 文字列の表示幅（半角1文字 = 1.0）
pub fn display_width(text: &str) -> f64 {
    text.chars()
        .map(|c| if is_wide_char(c) { WIDE_CHAR_FACTOR } else { 1.0 })
        .sum()
}

/// 列内の全セルから列幅を決める（余白込み、[12, 50] に収める）
pub fn column_width<'a, I>(cells: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    let max = cells
        .into_iter()
        .map(display_width)
        .fold(0.0_f64, f64::max);
    (max.ceil() + COLUMN_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

/// ヘッダーと全行から各列の幅を計算
pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<f64> {
    (0..headers.len())
        .map(|col| {
            let header = std::iter::once(headers[col].as_str());
            let values = rows
                .iter()
                .map(move |row| row.get(col).map(|s| s.as_str()).unwrap_or(""));
            column_width(header.chain(values))
        })
        .collect()
}
