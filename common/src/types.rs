//! アノテーションのデータモデル
//!
//! - BoundingBox: 画素座標の矩形（左上原点）
//! - Annotation: 1枚の画像に付いたラベル付き矩形
//! - ImageRecord: 読み込んだ画像のメタデータ（画素データは持たない）
//! - LabelSet: ラベルID → ラベル名

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// ラベルID → ラベル名（ID昇順）
pub type LabelSet = BTreeMap<i64, String>;

/// アノテーションID（セッション内で一意、内容から導出しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(Uuid);

impl AnnotationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 画像ID（読み込み時に発行、ファイルパスとは無関係）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 矩形
///
/// 幅・高さが正であることは生成側（AnnotationStore）で検証する。
/// ドラッグ中は負のサイズも一時的に存在しうる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// COCO形式 `[x, y, width, height]` から生成（小数は0方向へ切り捨て）
    pub fn from_coco(bbox: &[f64; 4]) -> Self {
        Self {
            x: bbox[0] as i32,
            y: bbox[1] as i32,
            width: bbox[2] as i32,
            height: bbox[3] as i32,
        }
    }

    /// 点が矩形内（境界を含む）にあるか
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        left <= x && x <= left + i64::from(self.width) && top <= y && y <= top + i64::from(self.height)
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// COCO形式 `[x, y, width, height]`
    pub fn to_coco(&self) -> [f64; 4] {
        [
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.height),
        ]
    }

    /// CSV形式 `x,y,width,height`
    pub fn to_csv_fields(&self) -> String {
        format!("{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// アノテーション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub bounding_box: BoundingBox,
    pub label_id: i64,
    pub label_name: String,
    pub image_id: ImageId,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Annotation {
    /// 新しいIDとタイムスタンプで生成
    pub fn new(image_id: ImageId, bounding_box: BoundingBox, label_id: i64, label_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AnnotationId::new(),
            bounding_box,
            label_id,
            label_name: label_name.into(),
            image_id,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn update_box(&mut self, bounding_box: BoundingBox) {
        self.bounding_box = bounding_box;
        self.modified_at = Utc::now();
    }

    pub fn update_label(&mut self, label_id: i64, label_name: impl Into<String>) {
        self.label_id = label_id;
        self.label_name = label_name.into();
        self.modified_at = Utc::now();
    }
}

/// 画像読み込み側から渡されるメタデータ
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    /// 拡張子の大文字表記（JPG, PNG など）
    pub format: String,
}

/// 画像レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,

    /// 画像ファイルの絶対パス
    pub file_path: PathBuf,

    /// エクスポート時の file_name（サブディレクトリ読み込み時はベースからの相対パス）
    pub filename: String,

    pub width: u32,
    pub height: u32,
    pub format: String,

    /// ストア外に持ち出したアノテーションの写し（インポート候補・エクスポート入力）
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ImageRecord {
    /// 新しい画像IDで生成（同じファイルでも毎回別レコード）
    pub fn new(file_path: impl Into<PathBuf>, filename: impl Into<String>, meta: ImageMeta) -> Self {
        Self {
            id: ImageId::new(),
            file_path: file_path.into(),
            filename: filename.into(),
            width: meta.width,
            height: meta.height,
            format: meta.format,
            annotations: Vec::new(),
        }
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn remove_annotation(&mut self, annotation_id: AnnotationId) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != annotation_id);
        self.annotations.len() < before
    }

    pub fn get_annotation(&self, annotation_id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == annotation_id)
    }

    /// `file_path` のファイル名部分
    pub fn basename(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| basename(&self.filename).to_string())
    }
}

/// `/` と `\` のどちらの区切りでも最後の要素を返す
pub fn basename(name: &str) -> &str {
    name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name)
}

/// 拡張子の大文字表記（拡張子なしは空文字）
pub fn format_from_path(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_inclusive_edges() {
        let b = BoundingBox::new(10, 20, 100, 50);
        assert!(b.contains_point(10, 20));
        assert!(b.contains_point(110, 70));
        assert!(b.contains_point(50, 40));
        assert!(!b.contains_point(9, 20));
        assert!(!b.contains_point(111, 70));
        assert!(!b.contains_point(50, 71));
    }

    #[test]
    fn test_contains_point_near_i32_max() {
        let b = BoundingBox::from_coco(&[2_147_483_000.0, 0.0, 1e12, 10.0]);
        assert_eq!(b.width, i32::MAX);
        assert!(b.contains_point(i32::MAX, 5));
        assert!(!b.contains_point(0, 5));
    }

    #[test]
    fn test_serialized_forms() {
        let b = BoundingBox::new(10, 20, 100, 50);
        assert_eq!(b.to_coco(), [10.0, 20.0, 100.0, 50.0]);
        assert_eq!(b.to_csv_fields(), "10,20,100,50");
        assert_eq!(b.area(), 5000);
    }

    #[test]
    fn test_from_coco_truncates() {
        let b = BoundingBox::from_coco(&[10.9, 20.2, 99.99, 50.5]);
        assert_eq!(b, BoundingBox::new(10, 20, 99, 50));
    }

    #[test]
    fn test_update_bumps_modified_at() {
        let mut ann = Annotation::new(ImageId::new(), BoundingBox::new(0, 0, 5, 5), 1, "cat");
        let created = ann.created_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        ann.update_label(2, "dog");
        assert_eq!(ann.created_at, created);
        assert!(ann.modified_at > created);
        assert_eq!(ann.label_name, "dog");
    }

    #[test]
    fn test_same_file_twice_yields_distinct_records() {
        let a = ImageRecord::new("/data/cat.jpg", "cat.jpg", ImageMeta::default());
        let b = ImageRecord::new("/data/cat.jpg", "cat.jpg", ImageMeta::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_record_annotation_list() {
        let mut img = ImageRecord::new("/data/cat.jpg", "cat.jpg", ImageMeta::default());
        let ann = Annotation::new(img.id, BoundingBox::new(0, 0, 5, 5), 1, "cat");
        let id = ann.id;
        img.add_annotation(ann);
        assert!(img.get_annotation(id).is_some());
        assert!(img.remove_annotation(id));
        assert!(!img.remove_annotation(id));
    }

    #[test]
    fn test_basename_both_separators() {
        assert_eq!(basename("train/images/cat.jpg"), "cat.jpg");
        assert_eq!(basename("train\\images\\cat.jpg"), "cat.jpg");
        assert_eq!(basename("cat.jpg"), "cat.jpg");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(format_from_path(Path::new("a/b.jpg")), "JPG");
        assert_eq!(format_from_path(Path::new("a/b.Png")), "PNG");
        assert_eq!(format_from_path(Path::new("a/b")), "");
    }
}
