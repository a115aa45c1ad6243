//! 矩形アノテーションの管理と CSV / COCO JSON の入出力
//!
//! データモデルと管理ロジックは `bbox_annotator_common`、
//! ファイルを扱う部分（画像の列挙・読み込み、インポート、エクスポート）はこのクレート。

pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod prompt;
pub mod scanner;
pub mod session;

pub use collection::{ImageCollection, LoadReport, LoadWarning};
pub use error::{AnnotatorError, Result};
pub use import::{import_from_coco, CocoImport, ImportWarning};
pub use session::{MergeReport, Session};
