//! CSV / COCO JSON へのエクスポート
//!
//! 入力は画像レコードの並び（各レコードの annotations にアノテーションを詰めたもの）。
//! 書き込み途中で失敗したファイルは不完全とみなす。

pub mod csv;
pub mod coco;

pub use self::coco::{build_coco, to_coco};
pub use self::csv::{to_csv, write_csv, CSV_HEADER};

use crate::error::Result;
use bbox_annotator_common::ImageRecord;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    #[default]
    Coco,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Coco => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "coco" | "json" => Ok(ExportFormat::Coco),
            _ => Err(format!("Unknown format: {}. Use csv or coco", s)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Coco => write!(f, "coco"),
        }
    }
}

/// 出力先がディレクトリなら `annotations.<拡張子>` を付ける
pub fn output_path_for_format(output: &Path, format: ExportFormat) -> std::path::PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("annotations.{}", format.extension()))
    } else {
        output.to_path_buf()
    }
}

pub fn export_images(
    images: &[ImageRecord],
    format: ExportFormat,
    output_path: &Path,
    use_relative_paths: bool,
) -> Result<()> {
    match format {
        ExportFormat::Csv => to_csv(images, output_path),
        ExportFormat::Coco => to_coco(images, output_path, use_relative_paths),
    }
}
