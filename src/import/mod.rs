//! COCO JSON からのインポート
//!
//! ファイルからメモリ上の候補オブジェクトへの変換だけを行い、
//! セッションのストアには触らない（取り込みは session 側）。
//!
//! 処理順:
//! 1. JSONを読み、images / annotations / categories の有無を確認
//! 2. categories から label_map を作る
//! 3. 各画像の file_name を実ファイルへ解決（resolver の戦略を順に）
//! 4. bbox を整数へ切り捨て、新しい内部IDで Annotation を作る
//! 5. COCO の image_id ごとに画像レコードへ付ける

pub mod resolver;

use crate::error::{AnnotatorError, Result};
use bbox_annotator_common::{
    format_from_path, Annotation, BoundingBox, CocoAnnotation, CocoDataset, ImageMeta,
    ImageRecord, LabelSet,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// インポートで飛ばしたデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    /// 画像ファイルが見つからず、その画像とアノテーションを捨てた
    ImageNotFound {
        coco_image_id: i64,
        file_name: String,
        dropped_annotations: usize,
    },
    /// どの画像にも対応しない image_id を持つアノテーション
    OrphanAnnotation {
        coco_annotation_id: i64,
        coco_image_id: i64,
    },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::ImageNotFound {
                coco_image_id,
                file_name,
                dropped_annotations,
            } => write!(
                f,
                "画像ファイルが見つかりません (image_id={}): {}（アノテーション{}件を除外）",
                coco_image_id, file_name, dropped_annotations
            ),
            ImportWarning::OrphanAnnotation {
                coco_annotation_id,
                coco_image_id,
            } => write!(
                f,
                "対応する画像がないアノテーション (id={}, image_id={})",
                coco_annotation_id, coco_image_id
            ),
        }
    }
}

/// インポート結果
#[derive(Debug, Clone, Default)]
pub struct CocoImport {
    /// 解決できた画像（アノテーション付き、COCOファイルの順）
    pub images: Vec<ImageRecord>,
    /// category id → name
    pub labels: LabelSet,
    pub warnings: Vec<ImportWarning>,
}

impl CocoImport {
    pub fn annotation_count(&self) -> usize {
        self.images.iter().map(|i| i.annotations.len()).sum()
    }
}

/// COCO JSONファイルを読み込む
///
/// `base_image_path` 省略時はCOCOファイルのあるディレクトリを基準にする。
pub fn import_from_coco(coco_path: &Path, base_image_path: Option<&Path>) -> Result<CocoImport> {
    if !coco_path.is_file() {
        return Err(AnnotatorError::FileNotFound(coco_path.display().to_string()));
    }

    log::info!("importing COCO annotations from {}", coco_path.display());
    let content = std::fs::read_to_string(coco_path)?;
    let coco = parse_coco(&content)?;

    let base = match base_image_path {
        Some(base) => base.to_path_buf(),
        None => coco_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let import = convert(coco, &base)?;
    log::info!(
        "imported {} images with {} annotations ({} warnings)",
        import.images.len(),
        import.annotation_count(),
        import.warnings.len()
    );
    Ok(import)
}

/// 必須キーを確認してスキーマへ変換
pub fn parse_coco(content: &str) -> Result<CocoDataset> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| AnnotatorError::Format(format!("JSONとして読めません: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(AnnotatorError::Format("トップレベルがオブジェクトではありません".into()));
    };
    for key in CocoDataset::REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(AnnotatorError::Format(format!("必須キーがありません: {}", key)));
        }
    }

    serde_json::from_value(value).map_err(|e| AnnotatorError::Format(e.to_string()))
}

fn bbox_of(annotation: &CocoAnnotation) -> Result<BoundingBox> {
    let bbox: &[f64; 4] = annotation.bbox.as_slice().try_into().map_err(|_| {
        AnnotatorError::Format(format!(
            "annotation {}: bbox は4要素が必要です（{}要素）",
            annotation.id,
            annotation.bbox.len()
        ))
    })?;
    Ok(BoundingBox::from_coco(bbox))
}

/// 読み込み済みのCOCOデータを候補オブジェクトへ変換
pub fn convert(coco: CocoDataset, base: &Path) -> Result<CocoImport> {
    let mut labels: LabelSet = coco
        .categories
        .iter()
        .map(|c| (c.id, c.name.clone()))
        .collect();

    let mut image_ids = HashSet::new();
    for image in &coco.images {
        if !image_ids.insert(image.id) {
            return Err(AnnotatorError::Format(format!("image id が重複しています: {}", image.id)));
        }
    }

    let mut warnings = Vec::new();
    let mut by_image: HashMap<i64, Vec<(BoundingBox, &CocoAnnotation)>> = HashMap::new();
    for annotation in &coco.annotations {
        let bbox = bbox_of(annotation)?;
        if !image_ids.contains(&annotation.image_id) {
            log::warn!(
                "annotation {} refers to unknown image {}",
                annotation.id,
                annotation.image_id
            );
            warnings.push(ImportWarning::OrphanAnnotation {
                coco_annotation_id: annotation.id,
                coco_image_id: annotation.image_id,
            });
            continue;
        }
        by_image
            .entry(annotation.image_id)
            .or_default()
            .push((bbox, annotation));
    }

    let mut images = Vec::new();
    for coco_image in &coco.images {
        let annotations = by_image.remove(&coco_image.id).unwrap_or_default();

        let Some(file_path) = resolver::resolve(base, &coco_image.file_name) else {
            log::warn!(
                "could not find image file {} under {}",
                coco_image.file_name,
                base.display()
            );
            warnings.push(ImportWarning::ImageNotFound {
                coco_image_id: coco_image.id,
                file_name: coco_image.file_name.clone(),
                dropped_annotations: annotations.len(),
            });
            continue;
        };

        let meta = ImageMeta {
            width: coco_image.width,
            height: coco_image.height,
            format: format_from_path(Path::new(&coco_image.file_name)),
        };
        let mut record = ImageRecord::new(file_path, coco_image.file_name.clone(), meta);

        for (bbox, annotation) in annotations {
            // categories にないIDは unknown_<id> として語彙にも載せる
            let label_name = labels
                .entry(annotation.category_id)
                .or_insert_with(|| format!("unknown_{}", annotation.category_id))
                .clone();
            let converted = Annotation::new(record.id, bbox, annotation.category_id, label_name);
            record.add_annotation(converted);
        }

        images.push(record);
    }

    Ok(CocoImport {
        images,
        labels,
        warnings,
    })
}
