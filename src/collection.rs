//! 読み込み済み画像の管理とカーソル移動

use crate::error::Result;
use crate::scanner::{self, ImageLoader, SubdirectoryConfig};
use bbox_annotator_common::{ImageId, ImageMeta, ImageRecord};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// サブディレクトリ読み込みで飛ばしたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} を読み込めません: {}", self.path.display(), self.reason)
    }
}

/// サブディレクトリ読み込みの結果
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// 登録した画像のID（登録順）
    pub loaded: Vec<ImageId>,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn count(&self) -> usize {
        self.loaded.len()
    }
}

/// 画像コレクション
#[derive(Debug, Clone, Default)]
pub struct ImageCollection {
    images: HashMap<ImageId, ImageRecord>,
    order: Vec<ImageId>,
    current: Option<usize>,
    base_path: Option<PathBuf>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 画像を追加して発行したIDを返す（filename はファイル名部分、file_path は絶対パスにする）
    pub fn add(&mut self, file_path: impl Into<PathBuf>, meta: ImageMeta) -> ImageId {
        let file_path = file_path.into();
        let file_path = std::path::absolute(&file_path).unwrap_or(file_path);
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.add_record(ImageRecord::new(file_path, filename, meta))
    }

    /// 組み立て済みのレコードを追加（インポート結果など）
    pub fn add_record(&mut self, record: ImageRecord) -> ImageId {
        let id = record.id;
        self.images.insert(id, record);
        self.order.push(id);
        if self.current.is_none() {
            self.current = Some(0);
        }
        id
    }

    pub fn remove(&mut self, image_id: ImageId) -> bool {
        if self.images.remove(&image_id).is_none() {
            return false;
        }
        self.order.retain(|id| *id != image_id);

        self.current = match self.current {
            _ if self.order.is_empty() => None,
            Some(index) if index >= self.order.len() => Some(self.order.len() - 1),
            other => other,
        };
        true
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.current
            .and_then(|index| self.order.get(index))
            .and_then(|id| self.images.get(id))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// 次の画像へ。最後の画像では動かず None
    pub fn advance(&mut self) -> Option<&ImageRecord> {
        let index = self.current?;
        if index + 1 >= self.order.len() {
            return None;
        }
        self.current = Some(index + 1);
        self.current()
    }

    /// 前の画像へ。先頭では動かず None
    pub fn retreat(&mut self) -> Option<&ImageRecord> {
        let index = self.current?;
        if index == 0 {
            return None;
        }
        self.current = Some(index - 1);
        self.current()
    }

    pub fn goto(&mut self, image_id: ImageId) -> bool {
        match self.order.iter().position(|id| *id == image_id) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn by_id(&self, image_id: ImageId) -> Option<&ImageRecord> {
        self.images.get(&image_id)
    }

    pub fn contains(&self, image_id: ImageId) -> bool {
        self.images.contains_key(&image_id)
    }

    /// 全画像（追加順）
    pub fn all(&self) -> Vec<&ImageRecord> {
        self.order.iter().filter_map(|id| self.images.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn set_base_path(&mut self, base_path: impl Into<PathBuf>) {
        self.base_path = Some(base_path.into());
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// 全消去（新しい画像セットを読み込む前）
    pub fn clear(&mut self) {
        self.images.clear();
        self.order.clear();
        self.current = None;
        self.base_path = None;
    }

    /// 各サブディレクトリ直下の画像を読み込む
    ///
    /// filename はベースパスからの相対パスになる。読めないファイルは
    /// 警告に記録して飛ばし、残りの読み込みは続ける。
    pub fn load_from_subdirectories<L: ImageLoader>(
        &mut self,
        config: &SubdirectoryConfig,
        loader: &L,
    ) -> Result<LoadReport> {
        self.load_from_subdirectories_with_progress(config, loader, |_, _| {})
    }

    /// `load_from_subdirectories` と同じ。1ファイルごとに `(処理済み件数, 全件数)` を通知する
    pub fn load_from_subdirectories_with_progress<L, F>(
        &mut self,
        config: &SubdirectoryConfig,
        loader: &L,
        mut on_progress: F,
    ) -> Result<LoadReport>
    where
        L: ImageLoader,
        F: FnMut(usize, usize),
    {
        let mut paths = Vec::new();
        for dir in config.directories() {
            paths.extend(scanner::list_images(&dir)?);
        }

        self.base_path = Some(config.base_path().to_path_buf());
        let total = paths.len();
        let mut report = LoadReport::default();

        for (index, path) in paths.into_iter().enumerate() {
            match loader.load(&path) {
                Ok((_, meta)) => {
                    let filename = config.relative_name(&path);
                    let record = ImageRecord::new(path, filename, meta);
                    report.loaded.push(self.add_record(record));
                }
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    report.warnings.push(LoadWarning {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
            on_progress(index + 1, total);
        }

        log::info!(
            "loaded {} images from {} subdirectories ({} skipped)",
            report.count(),
            config.subdirectories().len(),
            report.warnings.len()
        );
        Ok(report)
    }
}
