//! アノテーションストア
//!
//! ID → Annotation のマップを唯一の実体とし、画像ID → ID列 の索引を
//! 作成・削除のたびに追従させる。画像側のリストは `for_image` で導出する。

use crate::error::{Error, Result};
use crate::types::{Annotation, AnnotationId, BoundingBox, ImageId};
use std::collections::HashMap;

/// アノテーション管理
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    annotations: HashMap<AnnotationId, Annotation>,
    by_image: HashMap<ImageId, Vec<AnnotationId>>,
    /// 画像が初めて登場した順（`all` の順序を決める）
    image_order: Vec<ImageId>,
    validation_enabled: bool,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AnnotationStore {
    /// `validation_enabled = false` は検証済みデータの再取り込みやテスト用
    pub fn new(validation_enabled: bool) -> Self {
        Self {
            annotations: HashMap::new(),
            by_image: HashMap::new(),
            image_order: Vec::new(),
            validation_enabled,
        }
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }

    /// アノテーションを作成
    pub fn create(
        &mut self,
        image_id: ImageId,
        bounding_box: BoundingBox,
        label_id: i64,
        label_name: &str,
    ) -> Result<Annotation> {
        let annotation = Annotation::new(image_id, bounding_box, label_id, label_name);
        self.check(&annotation)?;
        self.index(annotation.clone());
        Ok(annotation)
    }

    /// 外部で組み立てたアノテーションを登録（image_id は付け替える）
    pub fn adopt(&mut self, image_id: ImageId, mut annotation: Annotation) -> Result<AnnotationId> {
        annotation.image_id = image_id;
        if self.annotations.contains_key(&annotation.id) {
            return Err(Error::Validation(format!(
                "annotation {} is already registered",
                annotation.id
            )));
        }
        self.check(&annotation)?;
        let id = annotation.id;
        self.index(annotation);
        Ok(id)
    }

    /// 検証（ストアの状態には依存しない）
    pub fn validate(annotation: &Annotation) -> std::result::Result<(), String> {
        if annotation.label_id <= 0 {
            return Err("Label ID must be positive".into());
        }
        if annotation.label_name.trim().is_empty() {
            return Err("Label name cannot be empty".into());
        }
        let b = &annotation.bounding_box;
        if b.width <= 0 || b.height <= 0 {
            return Err("Bounding box must have positive width and height".into());
        }
        Ok(())
    }

    fn check(&self, annotation: &Annotation) -> Result<()> {
        if self.validation_enabled {
            Self::validate(annotation)
                .map_err(|reason| Error::Validation(format!("Invalid annotation: {}", reason)))?;
        }
        Ok(())
    }

    fn index(&mut self, annotation: Annotation) {
        let image_id = annotation.image_id;
        if !self.by_image.contains_key(&image_id) {
            self.image_order.push(image_id);
        }
        self.by_image.entry(image_id).or_default().push(annotation.id);
        self.annotations.insert(annotation.id, annotation);
    }

    pub fn get(&self, annotation_id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(&annotation_id)
    }

    /// 矩形を更新（未知のIDは Ok(false)、不正な矩形はエラーで変更なし）
    pub fn update_geometry(&mut self, annotation_id: AnnotationId, bounding_box: BoundingBox) -> Result<bool> {
        let Some(current) = self.annotations.get(&annotation_id) else {
            return Ok(false);
        };
        let mut updated = current.clone();
        updated.update_box(bounding_box);
        self.check(&updated)?;
        self.annotations.insert(annotation_id, updated);
        Ok(true)
    }

    /// ラベルを更新（未知のIDは Ok(false)、不正なラベルはエラーで変更なし）
    pub fn update_label(&mut self, annotation_id: AnnotationId, label_id: i64, label_name: &str) -> Result<bool> {
        let Some(current) = self.annotations.get(&annotation_id) else {
            return Ok(false);
        };
        let mut updated = current.clone();
        updated.update_label(label_id, label_name);
        self.check(&updated)?;
        self.annotations.insert(annotation_id, updated);
        Ok(true)
    }

    /// 削除（マップと画像索引の両方から外す）
    pub fn delete(&mut self, annotation_id: AnnotationId) -> bool {
        let Some(annotation) = self.annotations.remove(&annotation_id) else {
            return false;
        };
        if let Some(ids) = self.by_image.get_mut(&annotation.image_id) {
            ids.retain(|id| *id != annotation_id);
            if ids.is_empty() {
                self.by_image.remove(&annotation.image_id);
                self.image_order.retain(|id| *id != annotation.image_id);
            }
        }
        true
    }

    /// 画像に付いたアノテーションをすべて削除し、削除件数を返す
    pub fn remove_image(&mut self, image_id: ImageId) -> usize {
        let Some(ids) = self.by_image.remove(&image_id) else {
            return 0;
        };
        self.image_order.retain(|id| *id != image_id);
        for id in &ids {
            self.annotations.remove(id);
        }
        ids.len()
    }

    /// 画像のアノテーション（作成順）
    pub fn for_image(&self, image_id: ImageId) -> Vec<&Annotation> {
        self.by_image
            .get(&image_id)
            .map(|ids| ids.iter().filter_map(|id| self.annotations.get(id)).collect())
            .unwrap_or_default()
    }

    /// 全アノテーション（画像の登場順、画像内は作成順）
    pub fn all(&self) -> Vec<&Annotation> {
        self.image_order
            .iter()
            .flat_map(|image_id| self.for_image(*image_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.by_image.clear();
        self.image_order.clear();
    }
}
