pub mod excel;

use crate::error::{CompareError, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 出力ファイル名の接尾辞
pub const REPORT_SUFFIX: &str = "_compare_ERRORCODE";

/// バックアップ名を試す上限
pub const MAX_BACKUP_ATTEMPTS: usize = 10;

/// 来源ファイルの隣に `<stem>_compare_ERRORCODE.xlsx` を置く
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}{}.xlsx", stem, REPORT_SUFFIX))
}

/// `--output` の解釈（ディレクトリなら既定名を付ける）
pub fn output_path_for(source: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(out) if out.is_dir() || out.extension().is_none() => {
            let name = default_output_path(source)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_default();
            out.join(name)
        }
        Some(out) => out.to_path_buf(),
        None => default_output_path(source),
    }
}

/// `<stem>_backup_N.xlsx`
pub fn backup_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "xlsx".to_string());
    path.with_file_name(format!("{}_backup_{}.{}", stem, n, ext))
}

/// 書き込み中の出力パス一覧
#[derive(Debug, Clone, Default)]
pub struct WriteLocks {
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

/// 登録を外すガード
pub struct WriteGuard {
    locks: WriteLocks,
    path: PathBuf,
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.locks.release(&self.path);
    }
}

fn is_unwritable(path: &Path) -> bool {
    path.exists() && OpenOptions::new().write(true).open(path).is_err()
}

impl WriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 書き込み中として登録（既に登録済みなら None）
    pub fn acquire(&self, path: &Path) -> Option<WriteGuard> {
        if self.set().insert(path.to_path_buf()) {
            Some(WriteGuard {
                locks: self.clone(),
                path: path.to_path_buf(),
            })
        } else {
            None
        }
    }

    fn release(&self, path: &Path) {
        self.set().remove(path);
    }

    /// 登録済み、または既存ファイルを書き込みで開けない場合にロック中とみなす
    pub fn is_locked(&self, path: &Path) -> bool {
        if self.set().contains(path) {
            return true;
        }
        is_unwritable(path)
    }

    /// 書き込み先を登録しながら探す（だめならバックアップ名を順に試す）
    ///
    /// 候補の登録とディスク上の確認はガードを持った状態で行う。
    pub fn claim_output_path(&self, path: &Path) -> Result<(PathBuf, WriteGuard)> {
        let candidates = std::iter::once(path.to_path_buf())
            .chain((1..=MAX_BACKUP_ATTEMPTS).map(|n| backup_path(path, n)));

        for (n, candidate) in candidates.enumerate() {
            let Some(guard) = self.acquire(&candidate) else {
                warn!("出力先が使用中です: {}", candidate.display());
                continue;
            };
            if is_unwritable(&candidate) {
                warn!("出力先を開けません: {}", candidate.display());
                continue;
            }
            if n > 0 {
                info!("バックアップ名で出力します: {}", candidate.display());
            }
            return Ok((candidate, guard));
        }
        Err(CompareError::OutputLocked {
            path: path.to_path_buf(),
            attempts: MAX_BACKUP_ATTEMPTS,
        })
    }

    /// メモリ上で完成したバイト列を1回で書き出し、実際のパスを返す
    pub fn write_buffer_once(&self, path: &Path, buffer: &[u8]) -> Result<PathBuf> {
        let (target, _guard) = self.claim_output_path(path)?;

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&target, buffer)?;
        info!("出力しました: {} ({} bytes)", target.display(), buffer.len());
        Ok(target)
    }
}
