//! CSV出力
//!
//! `image_name,x,y,width,height,label_id,label_name` のヘッダ行に続き、
//! アノテーション1件につき1行。ヘッダは0件でも必ず書く。

use crate::error::Result;
use bbox_annotator_common::ImageRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: [&str; 7] = [
    "image_name",
    "x",
    "y",
    "width",
    "height",
    "label_id",
    "label_name",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    image_name: &'a str,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    label_id: i64,
    label_name: &'a str,
}

/// 書き込んだ行数（ヘッダを除く）を返す
pub fn write_csv<W: Write>(images: &[ImageRecord], writer: W) -> Result<usize> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for image in images {
        for annotation in &image.annotations {
            let b = &annotation.bounding_box;
            writer.serialize(CsvRow {
                image_name: &image.filename,
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
                label_id: annotation.label_id,
                label_name: &annotation.label_name,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

pub fn to_csv(images: &[ImageRecord], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let rows = write_csv(images, BufWriter::new(file))?;
    log::info!("wrote {} CSV rows to {}", rows, output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbox_annotator_common::{Annotation, BoundingBox, ImageMeta};

    fn image(name: &str, boxes: &[(i32, i32, i32, i32, i64, &str)]) -> ImageRecord {
        let mut record = ImageRecord::new(format!("/data/{}", name), name, ImageMeta::default());
        for &(x, y, w, h, label_id, label_name) in boxes {
            let ann = Annotation::new(record.id, BoundingBox::new(x, y, w, h), label_id, label_name);
            record.add_annotation(ann);
        }
        record
    }

    fn render(images: &[ImageRecord]) -> (usize, String) {
        let mut buf = Vec::new();
        let rows = write_csv(images, &mut buf).unwrap();
        (rows, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_header_only_when_no_annotations() {
        let (rows, text) = render(&[image("empty.jpg", &[])]);
        assert_eq!(rows, 0);
        assert_eq!(text, "image_name,x,y,width,height,label_id,label_name\n");
    }

    #[test]
    fn test_header_present_for_no_images() {
        let (rows, text) = render(&[]);
        assert_eq!(rows, 0);
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_rows_grouped_by_image_order() {
        let images = vec![
            image("b.jpg", &[(1, 2, 3, 4, 1, "cat"), (5, 6, 7, 8, 2, "dog")]),
            image("a.jpg", &[(10, 20, 100, 50, 1, "cat")]),
        ];
        let (rows, text) = render(&images);
        assert_eq!(rows, 3);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "b.jpg,1,2,3,4,1,cat");
        assert_eq!(lines[2], "b.jpg,5,6,7,8,2,dog");
        assert_eq!(lines[3], "a.jpg,10,20,100,50,1,cat");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let images = vec![image("sub/x.jpg", &[(0, 0, 1, 1, 3, "traffic light, red")])];
        let (_, text) = render(&images);
        assert!(text.contains("sub/x.jpg,0,0,1,1,3,\"traffic light, red\""));
    }
}
