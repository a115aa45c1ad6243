//! 画像ファイルの列挙とサブディレクトリ構成
//!
//! 画素の読み込み自体は `loader` の ImageLoader に委ねる。

mod loader;

pub use loader::{DecodingLoader, DimensionsLoader, ImageLoader};

use crate::error::{AnnotatorError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 対応拡張子（大文字小文字は区別しない）
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_supported_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

/// フォルダ直下の画像ファイルをファイル名順に列挙（再帰しない）
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(AnnotatorError::FolderNotFound(folder.display().to_string()));
    }

    let images = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
        .map(|e| e.into_path())
        .collect();

    Ok(images)
}

/// ベースパスと、その配下の読み込み対象サブディレクトリ
///
/// 生成時に `base_path` と各 `base_path/subdirectory` の存在を確認し、
/// `base_path` は絶対パスにして持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdirectoryConfig {
    base_path: PathBuf,
    subdirectories: Vec<String>,
}

impl SubdirectoryConfig {
    pub fn new(base_path: impl Into<PathBuf>, subdirectories: Vec<String>) -> Result<Self> {
        let base_path = base_path.into();
        if !base_path.is_dir() {
            return Err(AnnotatorError::FolderNotFound(base_path.display().to_string()));
        }
        // 以降のパスはすべて絶対パス
        let base_path = std::path::absolute(&base_path)?;

        for subdir in &subdirectories {
            let full = base_path.join(subdir);
            if !full.is_dir() {
                return Err(AnnotatorError::FolderNotFound(full.display().to_string()));
            }
        }

        Ok(Self {
            base_path,
            subdirectories,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn subdirectories(&self) -> &[String] {
        &self.subdirectories
    }

    /// 各サブディレクトリのフルパス
    pub fn directories(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.subdirectories.iter().map(|s| self.base_path.join(s))
    }

    /// ベースからの相対パス（区切りは `/`）
    pub fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.base_path).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
