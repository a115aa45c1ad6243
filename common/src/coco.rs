//! COCO JSON のスキーマ
//!
//! 読み込み時は `images` / `annotations` / `categories` を必須とし、
//! それ以外の項目は省略可能として扱う。

use serde::{Deserialize, Serialize};

/// COCO データセット
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoDataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<CocoInfo>,

    #[serde(default)]
    pub licenses: Vec<serde_json::Value>,

    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

impl CocoDataset {
    /// トップレベルで必須のキー
    pub const REQUIRED_KEYS: [&'static str; 3] = ["images", "annotations", "categories"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CocoInfo {
    pub description: String,
    pub url: String,
    pub version: String,
    pub year: i32,
    pub contributor: String,
    pub date_created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: i64,
    pub file_name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    #[serde(default)]
    pub id: i64,
    pub image_id: i64,
    pub category_id: i64,
    /// `[x, y, width, height]`
    pub bbox: Vec<f64>,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub segmentation: serde_json::Value,
    #[serde(default)]
    pub iscrowd: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub supercategory: String,
}
