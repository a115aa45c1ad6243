//! COCO JSON出力
//!
//! - images / annotations のIDは 1 始まりの通し番号（内部IDとは無関係）
//! - categories は実際に使われたラベルだけを ID 昇順で
//! - file_name は相対パス指定なら `filename`、そうでなければ `file_path` のファイル名

use crate::error::Result;
use bbox_annotator_common::{
    CocoAnnotation, CocoCategory, CocoDataset, CocoImage, CocoInfo, ImageRecord,
};
use chrono::{Datelike, Local};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 画像レコードから COCO データセットを組み立てる（info は付けない）
pub fn build_coco(images: &[ImageRecord], use_relative_paths: bool) -> CocoDataset {
    let mut coco = CocoDataset::default();
    let mut categories: BTreeMap<i64, &str> = BTreeMap::new();
    let mut annotation_id = 1;

    for (index, image) in images.iter().enumerate() {
        let image_id = (index + 1) as i64;

        let file_name = if use_relative_paths {
            image.filename.replace('\\', "/")
        } else {
            image.basename()
        };

        coco.images.push(CocoImage {
            id: image_id,
            file_name,
            width: image.width,
            height: image.height,
        });

        for annotation in &image.annotations {
            categories
                .entry(annotation.label_id)
                .or_insert(annotation.label_name.as_str());

            let b = &annotation.bounding_box;
            coco.annotations.push(CocoAnnotation {
                id: annotation_id,
                image_id,
                category_id: annotation.label_id,
                bbox: b.to_coco().to_vec(),
                area: b.area() as f64,
                segmentation: serde_json::Value::Array(Vec::new()),
                iscrowd: 0,
            });
            annotation_id += 1;
        }
    }

    coco.categories = categories
        .into_iter()
        .map(|(id, name)| CocoCategory {
            id,
            name: name.to_string(),
            supercategory: String::new(),
        })
        .collect();

    coco
}

fn info_section() -> CocoInfo {
    let now = Local::now();
    CocoInfo {
        description: "BBox Annotator - Annotated Dataset".into(),
        url: String::new(),
        version: "1.0".into(),
        year: now.year(),
        contributor: String::new(),
        date_created: now.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

pub fn to_coco(images: &[ImageRecord], output_path: &Path, use_relative_paths: bool) -> Result<()> {
    let mut coco = build_coco(images, use_relative_paths);
    coco.info = Some(info_section());

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &coco)?;
    writer.flush()?;

    log::info!(
        "wrote COCO with {} images, {} annotations, {} categories to {}",
        coco.images.len(),
        coco.annotations.len(),
        coco.categories.len(),
        output_path.display()
    );
    Ok(())
}
