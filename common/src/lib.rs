//! BBox Annotator Common Library
//!
//! アノテーションのデータモデルと、ファイルI/Oを伴わない管理ロジック

pub mod types;
pub mod error;
pub mod labels;
pub mod store;
pub mod coco;
pub mod stats;

pub use types::{
    basename, format_from_path, Annotation, AnnotationId, BoundingBox, ImageId, ImageMeta,
    ImageRecord, LabelSet,
};
pub use error::{Error, Result};
pub use labels::{LabelManager, LabelRemap};
pub use store::AnnotationStore;
pub use coco::{CocoAnnotation, CocoCategory, CocoDataset, CocoImage, CocoInfo};
pub use stats::{export_stats, ExportStats};
