//! CSV / COCO 出力の統合テスト

use bbox_annotator::export::{self, ExportFormat};
use bbox_annotator_common::{Annotation, BoundingBox, ImageMeta, ImageRecord};
use serde_json::Value;
use tempfile::tempdir;

fn create_test_image(filename: &str, boxes: &[(i32, i32, i32, i32, i64, &str)]) -> ImageRecord {
    let mut record = ImageRecord::new(
        format!("/data/{}", filename),
        filename,
        ImageMeta {
            width: 640,
            height: 480,
            format: "JPG".into(),
        },
    );
    for &(x, y, w, h, label_id, label_name) in boxes {
        let ann = Annotation::new(record.id, BoundingBox::new(x, y, w, h), label_id, label_name);
        record.add_annotation(ann);
    }
    record
}

#[test]
fn test_csv_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("annotations.csv");

    let images = vec![
        create_test_image("train/cat.jpg", &[(10, 20, 30, 40, 1, "cat"), (0, 0, 5, 5, 2, "dog")]),
        create_test_image("empty.jpg", &[]),
    ];
    export::to_csv(&images, &output_path).unwrap();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "image_name,x,y,width,height,label_id,label_name",
            "train/cat.jpg,10,20,30,40,1,cat",
            "train/cat.jpg,0,0,5,5,2,dog",
        ]
    );
}

#[test]
fn test_csv_export_empty_writes_header() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("empty.csv");

    export::to_csv(&[], &output_path).unwrap();

    let content = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(content.trim_end(), "image_name,x,y,width,height,label_id,label_name");
}

#[test]
fn test_csv_quotes_label_with_comma() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("quoted.csv");

    let images = vec![create_test_image("a.jpg", &[(1, 1, 1, 1, 1, "cat, black")])];
    export::to_csv(&images, &output_path).unwrap();

    let content = std::fs::read_to_string(&output_path).unwrap();
    assert!(content.contains("\"cat, black\""));
}

#[test]
fn test_coco_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("annotations.json");

    let images = vec![
        create_test_image("train/cat.jpg", &[(10, 20, 30, 40, 2, "dog"), (1, 2, 3, 4, 1, "cat")]),
        create_test_image("val/none.jpg", &[]),
    ];
    export::to_coco(&images, &output_path, true).unwrap();

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert!(json["info"].is_object());
    assert_eq!(json["images"].as_array().unwrap().len(), 2);
    assert_eq!(json["images"][0]["id"], 1);
    assert_eq!(json["images"][0]["file_name"], "train/cat.jpg");
    assert_eq!(json["images"][1]["file_name"], "val/none.jpg");

    let annotations = json["annotations"].as_array().unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0]["id"], 1);
    assert_eq!(annotations[0]["image_id"], 1);
    assert_eq!(annotations[0]["bbox"], serde_json::json!([10.0, 20.0, 30.0, 40.0]));
    assert_eq!(annotations[0]["area"], 1200.0);
    assert_eq!(annotations[0]["iscrowd"], 0);

    let categories: Vec<i64> = json["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(categories, vec![1, 2]);
}

#[test]
fn test_coco_export_flattened_file_names() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("flat.json");

    let images = vec![create_test_image("train/cat.jpg", &[])];
    export::to_coco(&images, &output_path, false).unwrap();

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(json["images"][0]["file_name"], "cat.jpg");
    assert!(json["annotations"].as_array().unwrap().is_empty());
    assert!(json["categories"].as_array().unwrap().is_empty());
}

#[test]
fn test_export_images_into_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = export::output_path_for_format(dir.path(), ExportFormat::Csv);
    assert_eq!(output_path, dir.path().join("annotations.csv"));

    export::export_images(&[], ExportFormat::Csv, &output_path, true).unwrap();
    assert!(output_path.exists());
}
