//! COCO の file_name を実ファイルへ解決する
//!
//! 戦略は順番に試し、最初に見つかったものを採用する。

use bbox_annotator_common::basename;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 1つの解決戦略
pub type Resolver = fn(base: &Path, file_name: &str) -> Option<PathBuf>;

/// 試す順の戦略一覧（名前はログ用）
pub const STRATEGIES: &[(&str, Resolver)] = &[
    ("verbatim", resolve_verbatim),
    ("basename", resolve_basename),
    ("recursive", resolve_recursive),
];

/// `base / file_name` をそのまま（相対パスを保ったエクスポート向け）
pub fn resolve_verbatim(base: &Path, file_name: &str) -> Option<PathBuf> {
    let candidate = base.join(file_name);
    candidate.is_file().then_some(candidate)
}

/// `base / basename(file_name)`（フラットに再エクスポートされたもの向け）
pub fn resolve_basename(base: &Path, file_name: &str) -> Option<PathBuf> {
    let name = basename(file_name);
    if name.is_empty() {
        return None;
    }
    let candidate = base.join(name);
    candidate.is_file().then_some(candidate)
}

/// `base` 配下を再帰的に探す（ファイル名順で最初の一致）
pub fn resolve_recursive(base: &Path, file_name: &str) -> Option<PathBuf> {
    let name = basename(file_name);
    if name.is_empty() {
        return None;
    }
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == name)
        .map(|e| e.into_path())
}

/// 全戦略を順に試す。見つかれば絶対パスで返す
pub fn resolve(base: &Path, file_name: &str) -> Option<PathBuf> {
    STRATEGIES.iter().find_map(|(strategy, resolver)| {
        let found = resolver(base, file_name)?;
        log::debug!("resolved {} via {} strategy: {}", file_name, strategy, found.display());
        Some(std::path::absolute(&found).unwrap_or(found))
    })
}
