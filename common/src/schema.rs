//! カタログ列スキーマ
//!
//! 列名の表記ゆれ（大文字小文字・空白・記号・旧スペル）を吸収して、
//! 読み込み時に一度だけ列番号を確定する。

/// カタログの正規8列
pub const CANONICAL_CATALOG_COLUMNS: [&str; 8] = [
    "Main Function",
    "Interface",
    "Internal Error Code",
    "Description",
    "Chinese",
    "Version",
    "Error Code",
    "Note",
];

/// カタログの論理フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogField {
    MainFunction,
    Interface,
    InternalCode,
    Description,
    Chinese,
    Version,
    ErrorCode,
    Note,
}

impl CatalogField {
    pub const ALL: [CatalogField; 8] = [
        CatalogField::MainFunction,
        CatalogField::Interface,
        CatalogField::InternalCode,
        CatalogField::Description,
        CatalogField::Chinese,
        CatalogField::Version,
        CatalogField::ErrorCode,
        CatalogField::Note,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            CatalogField::MainFunction => CANONICAL_CATALOG_COLUMNS[0],
            CatalogField::Interface => CANONICAL_CATALOG_COLUMNS[1],
            CatalogField::InternalCode => CANONICAL_CATALOG_COLUMNS[2],
            CatalogField::Description => CANONICAL_CATALOG_COLUMNS[3],
            CatalogField::Chinese => CANONICAL_CATALOG_COLUMNS[4],
            CatalogField::Version => CANONICAL_CATALOG_COLUMNS[5],
            CatalogField::ErrorCode => CANONICAL_CATALOG_COLUMNS[6],
            CatalogField::Note => CANONICAL_CATALOG_COLUMNS[7],
        }
    }

    /// 正規化済みの別名
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            CatalogField::MainFunction => &["mainfunction"],
            CatalogField::Interface => &["interface"],
            // 旧カタログは "Interenal" と綴っている
            CatalogField::InternalCode => &[
                "internalerrorcode",
                "interenalerrorcode",
                "internalcode",
                "testid",
            ],
            CatalogField::Description => &["description", "englishdescription"],
            CatalogField::Chinese => &[
                "chinese",
                "chinesedescription",
                "中文",
                "中文描述",
                "中文說明",
            ],
            CatalogField::Version => &["version"],
            CatalogField::ErrorCode => &["errorcode"],
            CatalogField::Note => &["note", "notes", "備註"],
        }
    }
}

/// 列名を比較用に正規化（小文字化し、英数字と漢字以外を除去）
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// 列数が8以上なら先頭8列を正規名に置き換える
///
/// # Returns
/// 置き換えたかどうか
pub fn apply_canonical_names(headers: &mut [String]) -> bool {
    if headers.len() < CANONICAL_CATALOG_COLUMNS.len() {
        return false;
    }
    for (header, canonical) in headers.iter_mut().zip(CANONICAL_CATALOG_COLUMNS) {
        *header = canonical.to_string();
    }
    true
}

/// 読み込み時に確定するカタログ列の位置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSchema {
    pub main_function: Option<usize>,
    pub interface: Option<usize>,
    pub internal_code: Option<usize>,
    pub description: Option<usize>,
    pub chinese: Option<usize>,
    pub version: Option<usize>,
    pub error_code: Option<usize>,
    pub note: Option<usize>,
    /// 列名が見つからず位置で決めた場合 true
    pub positional: bool,
}

impl CatalogSchema {
    /// ヘッダー行から列位置を検出
    ///
    /// コード列が名前で見つからず5列以上ある場合は、
    /// 旧形式（C列=コード、D列=英文、E列=中文）として位置で割り当てる。
    pub fn detect(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_name(h)).collect();
        let find = |field: CatalogField| {
            normalized
                .iter()
                .position(|h| field.aliases().contains(&h.as_str()))
        };

        let mut schema = Self {
            main_function: find(CatalogField::MainFunction),
            interface: find(CatalogField::Interface),
            internal_code: find(CatalogField::InternalCode),
            description: find(CatalogField::Description),
            chinese: find(CatalogField::Chinese),
            version: find(CatalogField::Version),
            error_code: find(CatalogField::ErrorCode),
            note: find(CatalogField::Note),
            positional: false,
        };

        if !schema.has_code_column() && headers.len() >= 5 {
            schema.internal_code = Some(2);
            schema.description = schema.description.or(Some(3));
            schema.chinese = schema.chinese.or(Some(4));
            schema.positional = true;
        }

        schema
    }

    pub fn column(&self, field: CatalogField) -> Option<usize> {
        match field {
            CatalogField::MainFunction => self.main_function,
            CatalogField::Interface => self.interface,
            CatalogField::InternalCode => self.internal_code,
            CatalogField::Description => self.description,
            CatalogField::Chinese => self.chinese,
            CatalogField::Version => self.version,
            CatalogField::ErrorCode => self.error_code,
            CatalogField::Note => self.note,
        }
    }

    pub fn has_code_column(&self) -> bool {
        self.internal_code.is_some() || self.error_code.is_some()
    }
}
