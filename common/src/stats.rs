//! エクスポート前の集計

use crate::types::ImageRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// データセットの統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    pub total_images: usize,
    pub total_annotations: usize,
    pub images_with_annotations: usize,
    pub images_without_annotations: usize,
    /// ラベル名 → 件数
    pub label_distribution: BTreeMap<String, usize>,
}

pub fn export_stats(images: &[ImageRecord]) -> ExportStats {
    let mut stats = ExportStats {
        total_images: images.len(),
        ..Default::default()
    };

    for image in images {
        if image.annotations.is_empty() {
            stats.images_without_annotations += 1;
        } else {
            stats.images_with_annotations += 1;
        }
        for annotation in &image.annotations {
            stats.total_annotations += 1;
            *stats
                .label_distribution
                .entry(annotation.label_name.clone())
                .or_insert(0) += 1;
        }
    }

    stats
}
