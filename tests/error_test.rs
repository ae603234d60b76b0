//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use errorcode_compare::error::CompareError;
use errorcode_compare::loader::{self, CatalogOptions};
use errorcode_compare::{CompareOptions, Comparer};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_workbook(path: &Path, sheet: &str, rows: &[&[&str]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

/// 存在しないカタログを読み込んだ場合
#[test]
fn test_load_nonexistent_catalog() {
    let result = loader::load_catalog(
        Path::new("/nonexistent/path/catalog.csv"),
        &CatalogOptions::default(),
    );
    assert!(matches!(result, Err(CompareError::FileNotFound(_))));
}

/// 指定シートがない場合は実在するシート名を返す
#[test]
fn test_catalog_sheet_missing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.xlsx");
    write_workbook(&path, "Other", &[&["Description"]]);

    let result = loader::load_catalog(&path, &CatalogOptions::default());
    match result {
        Err(CompareError::TableMissing { sheet, available }) => {
            assert_eq!(sheet, "Test Item All");
            assert_eq!(available, vec!["Other"]);
        }
        other => panic!("TableMissing を期待: {:?}", other.map(|c| c.len())),
    }
}

/// 文字コード候補を使い切った場合は部分的なカタログを返さない
#[test]
fn test_encoding_exhausted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.csv");
    let mut bytes = b"Internal Error Code,Description,Chinese\nE001,boot,".to_vec();
    bytes.extend_from_slice(&[0xB6, 0x7D, 0xBE, 0xF7]);
    bytes.push(b'\n');
    std::fs::write(&path, bytes).unwrap();

    let options = CatalogOptions {
        encodings: vec!["utf-8".to_string()],
        ..CatalogOptions::default()
    };
    match loader::load_catalog(&path, &options) {
        Err(CompareError::EncodingExhausted { path: p, attempted }) => {
            assert_eq!(p, path);
            assert_eq!(attempted, vec!["utf-8"]);
        }
        other => panic!("EncodingExhausted を期待: {:?}", other.map(|c| c.len())),
    }
}

/// カタログにコード列がない場合は実際の列一覧を含める
#[test]
fn test_catalog_without_code_column() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.csv");
    std::fs::write(&path, "Name,Value\na,b\n").unwrap();

    let err = loader::load_catalog(&path, &CatalogOptions::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Name"), "列一覧が含まれていない: {}", message);
    assert!(message.contains("Value"), "列一覧が含まれていない: {}", message);
}

/// 来源シートに必須列がない場合
#[test]
fn test_source_without_description() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("source.csv");
    std::fs::write(&path, "Summary,TestID\nboot,E001\n").unwrap();

    let result = Comparer::new(CompareOptions::default()).load_source(&path, "source");
    let err = result.map(|(s, _)| s.sheet_name).unwrap_err();
    assert!(matches!(err, CompareError::Common(_)));
    assert!(err.to_string().contains("Summary"));
}

/// CompareErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CompareError::Config("テスト設定エラー".to_string()),
        CompareError::FileNotFound("source.xlsx".to_string()),
        CompareError::FileUnreadable {
            path: PathBuf::from("broken.xlsx"),
            reason: "zip".to_string(),
        },
        CompareError::TableMissing {
            sheet: "Test Item All".to_string(),
            available: vec!["Sheet1".to_string()],
        },
        CompareError::EncodingExhausted {
            path: PathBuf::from("catalog.csv"),
            attempted: vec!["utf-8".to_string(), "big5".to_string()],
        },
        CompareError::OutputLocked {
            path: PathBuf::from("out.xlsx"),
            attempts: 10,
        },
        CompareError::RecommendationUnderflow { expected: 3, actual: 1 },
        CompareError::ExcelGeneration("Excel生成エラー".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }

    let err = CompareError::EncodingExhausted {
        path: PathBuf::from("catalog.csv"),
        attempted: vec!["utf-8".to_string(), "big5".to_string()],
    };
    assert!(err.to_string().contains("utf-8, big5"));
}

/// 共通ライブラリのエラーが透過的に表示される
#[test]
fn test_common_error_is_transparent() {
    let inner = errorcode_common::Error::Parse("推薦行が見つかりません".to_string());
    let expected = inner.to_string();
    let err: CompareError = inner.into();
    assert_eq!(err.to_string(), expected);
}
