//! 1回の編集セッション
//!
//! ラベル・画像・アノテーションの各管理オブジェクトを1つずつ持ち、
//! インポート結果の取り込みやエクスポート用スナップショットの作成を担う。
//! 同じプロセス内で複数のセッションを独立に持てる。

use crate::collection::{ImageCollection, LoadReport};
use crate::error::{AnnotatorError, Result};
use crate::export;
use crate::import::{CocoImport, ImportWarning};
use crate::scanner::{ImageLoader, SubdirectoryConfig};
use bbox_annotator_common::{
    Annotation, AnnotationId, AnnotationStore, BoundingBox, ImageId, ImageMeta, ImageRecord,
    LabelManager, LabelRemap, LabelSet,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// 取り込み時に飛ばしたアノテーション
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedAnnotation {
    pub filename: String,
    pub bounding_box: BoundingBox,
    pub label_id: i64,
    pub reason: String,
}

impl fmt::Display for RejectedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} のアノテーション (label={}, bbox={}) を除外: {}",
            self.filename,
            self.label_id,
            self.bounding_box.to_csv_fields(),
            self.reason
        )
    }
}

/// `merge_import` の結果
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub images_added: usize,
    pub annotations_added: usize,
    /// インポート側ラベルID → セッション側ラベルID
    pub label_remap: LabelRemap,
    pub import_warnings: Vec<ImportWarning>,
    pub rejected: Vec<RejectedAnnotation>,
}

/// 画像の削除とアノテーションの削除など、管理オブジェクトをまたぐ操作はここを通す
#[derive(Debug, Clone, Default)]
pub struct Session {
    labels: LabelManager,
    images: ImageCollection,
    annotations: AnnotationStore,
}

impl Session {
    pub fn new(validation_enabled: bool) -> Self {
        Self {
            labels: LabelManager::new(),
            images: ImageCollection::new(),
            annotations: AnnotationStore::new(validation_enabled),
        }
    }

    pub fn with_labels(labels: LabelSet, validation_enabled: bool) -> Self {
        Self {
            labels: LabelManager::with_labels(labels),
            ..Self::new(validation_enabled)
        }
    }

    pub fn labels(&self) -> &LabelManager {
        &self.labels
    }

    pub fn images(&self) -> &ImageCollection {
        &self.images
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// ラベルを語彙に追加（`LabelManager::add` と同じ規則）
    pub fn add_label(&mut self, label_id: i64, label_name: impl Into<String>) -> bool {
        self.labels.add(label_id, label_name)
    }

    pub fn add_image(&mut self, file_path: impl Into<PathBuf>, meta: ImageMeta) -> ImageId {
        self.images.add(file_path, meta)
    }

    pub fn advance(&mut self) -> Option<&ImageRecord> {
        self.images.advance()
    }

    pub fn retreat(&mut self) -> Option<&ImageRecord> {
        self.images.retreat()
    }

    pub fn goto(&mut self, image_id: ImageId) -> bool {
        self.images.goto(image_id)
    }

    fn label_name(&self, label_id: i64) -> Result<String> {
        self.labels
            .get_name(label_id)
            .map(str::to_string)
            .ok_or_else(|| {
                bbox_annotator_common::Error::Validation(format!("未定義のラベルID: {}", label_id)).into()
            })
    }

    /// 描画済みの矩形にラベルを付けて登録（ラベル名は語彙から引く）
    pub fn annotate(&mut self, image_id: ImageId, bounding_box: BoundingBox, label_id: i64) -> Result<Annotation> {
        if !self.images.contains(image_id) {
            return Err(AnnotatorError::UnknownImage(image_id.to_string()));
        }
        let label_name = self.label_name(label_id)?;
        Ok(self.annotations.create(image_id, bounding_box, label_id, &label_name)?)
    }

    /// 矩形の変更（選択・移動・リサイズ後）
    pub fn move_annotation(&mut self, annotation_id: AnnotationId, bounding_box: BoundingBox) -> Result<bool> {
        Ok(self.annotations.update_geometry(annotation_id, bounding_box)?)
    }

    /// ラベルの付け替え（ラベル名は語彙から引く、未定義のIDはエラー）
    pub fn relabel(&mut self, annotation_id: AnnotationId, label_id: i64) -> Result<bool> {
        let label_name = self.label_name(label_id)?;
        Ok(self.annotations.update_label(annotation_id, label_id, &label_name)?)
    }

    pub fn delete_annotation(&mut self, annotation_id: AnnotationId) -> bool {
        self.annotations.delete(annotation_id)
    }

    /// 画像とそのアノテーションを外す
    pub fn delete_image(&mut self, image_id: ImageId) -> bool {
        if !self.images.remove(image_id) {
            return false;
        }
        self.annotations.remove_image(image_id);
        true
    }

    /// 現在の画像のアノテーション（描画用）
    pub fn current_annotations(&self) -> Vec<&Annotation> {
        self.images
            .current()
            .map(|image| self.annotations.for_image(image.id))
            .unwrap_or_default()
    }

    pub fn load_subdirectories<L: ImageLoader>(
        &mut self,
        config: &SubdirectoryConfig,
        loader: &L,
    ) -> Result<LoadReport> {
        self.images.load_from_subdirectories(config, loader)
    }

    pub fn load_subdirectories_with_progress<L, F>(
        &mut self,
        config: &SubdirectoryConfig,
        loader: &L,
        on_progress: F,
    ) -> Result<LoadReport>
    where
        L: ImageLoader,
        F: FnMut(usize, usize),
    {
        self.images
            .load_from_subdirectories_with_progress(config, loader, on_progress)
    }

    /// インポート結果を取り込む
    ///
    /// ラベル語彙を衝突なしでマージし、アノテーションのラベルIDを付け替えたうえで
    /// 画像とアノテーションを登録する。検証に通らないアノテーションは除外して記録する。
    /// 同じファイルを2回取り込むと、毎回新しいIDで重複して登録される。
    pub fn merge_import(&mut self, import: CocoImport) -> MergeReport {
        let label_remap = self.labels.merge(&import.labels);
        let mut report = MergeReport {
            label_remap,
            import_warnings: import.warnings,
            ..Default::default()
        };

        for mut record in import.images {
            // 取り込みのたびに新しいIDを振る
            record.id = ImageId::new();
            let annotations = std::mem::take(&mut record.annotations);
            let filename = record.filename.clone();
            let image_id = self.images.add_record(record);
            report.images_added += 1;

            for mut annotation in annotations {
                annotation.id = AnnotationId::new();
                if !report.label_remap.contains_key(&annotation.label_id) {
                    // 語彙に載っていないラベルも衝突なしで取り込む
                    let incoming = LabelSet::from([(annotation.label_id, annotation.label_name.clone())]);
                    let remap = self.labels.merge(&incoming);
                    report.label_remap.extend(remap);
                }
                if let Some(&target) = report.label_remap.get(&annotation.label_id) {
                    if let Some(name) = self.labels.get_name(target) {
                        annotation.label_name = name.to_string();
                        annotation.label_id = target;
                    }
                }

                match self.annotations.adopt(image_id, annotation.clone()) {
                    Ok(_) => report.annotations_added += 1,
                    Err(e) => {
                        log::warn!("rejected imported annotation on {}: {}", filename, e);
                        report.rejected.push(RejectedAnnotation {
                            filename: filename.clone(),
                            bounding_box: annotation.bounding_box,
                            label_id: annotation.label_id,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        report
    }

    /// エクスポート用のスナップショット（画像順、各画像のアノテーションは作成順）
    pub fn images_for_export(&self) -> Vec<ImageRecord> {
        self.images
            .all()
            .into_iter()
            .map(|image| {
                let mut record = image.clone();
                record.annotations = self
                    .annotations
                    .for_image(image.id)
                    .into_iter()
                    .cloned()
                    .collect();
                record
            })
            .collect()
    }

    pub fn export_csv(&self, output_path: &Path) -> Result<()> {
        export::to_csv(&self.images_for_export(), output_path)
    }

    pub fn export_coco(&self, output_path: &Path, use_relative_paths: bool) -> Result<()> {
        export::to_coco(&self.images_for_export(), output_path, use_relative_paths)
    }

    /// 画像とアノテーションを破棄（ラベル語彙は残す）
    pub fn reset(&mut self) {
        self.images.clear();
        self.annotations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_image() -> (Session, ImageId) {
        let mut session = Session::with_labels(LabelSet::from([(1, "cat".into()), (2, "dog".into())]), true);
        let image_id = session.images.add(
            "/data/cat.jpg",
            ImageMeta {
                width: 640,
                height: 480,
                format: "JPG".into(),
            },
        );
        (session, image_id)
    }

    fn imported(filename: &str, boxes: &[(i64, &str, i32)], labels: &[(i64, &str)]) -> CocoImport {
        let mut record = ImageRecord::new(format!("/import/{}", filename), filename, ImageMeta::default());
        for &(label_id, label_name, width) in boxes {
            let ann = Annotation::new(record.id, BoundingBox::new(0, 0, width, 5), label_id, label_name);
            record.add_annotation(ann);
        }
        CocoImport {
            images: vec![record],
            labels: labels.iter().map(|&(id, n)| (id, n.to_string())).collect(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_annotate_looks_up_label_name() {
        let (mut session, image_id) = session_with_image();
        let ann = session.annotate(image_id, BoundingBox::new(1, 2, 3, 4), 2).unwrap();
        assert_eq!(ann.label_name, "dog");
        assert_eq!(session.current_annotations().len(), 1);
    }

    #[test]
    fn test_annotate_unknown_image() {
        let (mut session, _) = session_with_image();
        let result = session.annotate(ImageId::new(), BoundingBox::new(1, 2, 3, 4), 1);
        assert!(matches!(result, Err(AnnotatorError::UnknownImage(_))));
    }

    #[test]
    fn test_annotate_undefined_label() {
        let (mut session, image_id) = session_with_image();
        let result = session.annotate(image_id, BoundingBox::new(1, 2, 3, 4), 9);
        assert!(matches!(result, Err(AnnotatorError::Common(_))));
        assert!(session.annotations.is_empty());
    }

    #[test]
    fn test_move_and_relabel() {
        let (mut session, image_id) = session_with_image();
        let ann = session.annotate(image_id, BoundingBox::new(1, 2, 3, 4), 1).unwrap();

        assert!(session.move_annotation(ann.id, BoundingBox::new(5, 5, 5, 5)).unwrap());
        assert!(session.relabel(ann.id, 2).unwrap());
        assert!(session.relabel(ann.id, 9).is_err());

        let stored = session.annotations.get(ann.id).unwrap();
        assert_eq!(stored.bounding_box, BoundingBox::new(5, 5, 5, 5));
        assert_eq!(stored.label_name, "dog");
    }

    #[test]
    fn test_delete_image_drops_annotations() {
        let (mut session, image_id) = session_with_image();
        session.annotate(image_id, BoundingBox::new(1, 2, 3, 4), 1).unwrap();
        assert!(session.delete_image(image_id));
        assert!(session.annotations.is_empty());
        assert!(!session.delete_image(image_id));
    }

    #[test]
    fn test_images_for_export_reflects_deletes() {
        let (mut session, image_id) = session_with_image();
        let keep = session.annotate(image_id, BoundingBox::new(1, 1, 3, 3), 1).unwrap();
        let gone = session.annotate(image_id, BoundingBox::new(2, 2, 3, 3), 2).unwrap();
        assert!(session.delete_annotation(gone.id));

        let snapshot = session.images_for_export();
        assert_eq!(snapshot.len(), 1);
        let ids: Vec<AnnotationId> = snapshot[0].annotations.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![keep.id]);
    }

    #[test]
    fn test_merge_import_remaps_colliding_label() {
        let (mut session, _) = session_with_image();
        let import = imported("bird.jpg", &[(1, "bird", 5)], &[(1, "bird")]);

        let report = session.merge_import(import);
        assert_eq!(report.images_added, 1);
        assert_eq!(report.annotations_added, 1);
        assert_eq!(report.label_remap[&1], 3);
        assert_eq!(session.labels.get_name(3), Some("bird"));

        let bird = session.images.all()[1].id;
        let anns = session.annotations.for_image(bird);
        assert_eq!(anns[0].label_id, 3);
        assert_eq!(anns[0].label_name, "bird");
    }

    #[test]
    fn test_merge_import_label_missing_from_vocabulary() {
        let mut session = Session::with_labels(LabelSet::from([(9, "dog".into())]), true);
        let import = imported("odd.jpg", &[(9, "unknown_9", 5)], &[]);

        let report = session.merge_import(import);
        assert_eq!(report.label_remap[&9], 10);
        assert_eq!(session.labels.get_name(9), Some("dog"));
        assert_eq!(session.labels.get_name(10), Some("unknown_9"));

        let anns = session.annotations.all();
        assert_eq!(anns[0].label_id, 10);
        assert_eq!(anns[0].label_name, "unknown_9");
    }

    #[test]
    fn test_relabel_undefined_label() {
        let mut session = Session::with_labels(LabelSet::from([(1, "cat".into())]), false);
        let image_id = session.add_image("/data/cat.jpg", ImageMeta::default());
        let ann = session.annotate(image_id, BoundingBox::new(1, 1, 3, 3), 1).unwrap();

        assert!(matches!(session.relabel(ann.id, 7), Err(AnnotatorError::Common(_))));
        assert_eq!(session.annotations.get(ann.id).unwrap().label_name, "cat");
    }

    #[test]
    fn test_merge_import_rejects_invalid_boxes() {
        let mut session = Session::new(true);
        let import = imported("thin.jpg", &[(1, "cat", 0), (1, "cat", 4)], &[(1, "cat")]);

        let report = session.merge_import(import);
        assert_eq!(report.annotations_added, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].filename, "thin.jpg");
    }

    #[test]
    fn test_merge_same_import_twice_duplicates() {
        let mut session = Session::new(true);
        let import = imported("cat.jpg", &[(1, "cat", 5)], &[(1, "cat")]);

        session.merge_import(import.clone());
        session.merge_import(import);
        assert_eq!(session.images.len(), 2);
        assert_eq!(session.annotations.len(), 2);
    }

    #[test]
    fn test_reset_keeps_labels() {
        let (mut session, image_id) = session_with_image();
        session.annotate(image_id, BoundingBox::new(1, 1, 3, 3), 1).unwrap();
        session.reset();
        assert!(session.images.is_empty());
        assert!(session.annotations.is_empty());
        assert!(session.labels.has_any());
    }
}
