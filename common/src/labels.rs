//! ラベル語彙の管理
//!
//! アノテーション開始前に定義する ID → 名前 の対応表。
//! 画像や矩形の知識は持たない。

use crate::types::LabelSet;
use std::collections::BTreeMap;

/// インポート側ラベルID → セッション側ラベルID
pub type LabelRemap = BTreeMap<i64, i64>;

/// ラベル管理
#[derive(Debug, Clone, Default)]
pub struct LabelManager {
    labels: LabelSet,
}

impl LabelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(labels: LabelSet) -> Self {
        Self { labels }
    }

    /// ラベル一式を置き換える
    pub fn set_labels(&mut self, labels: LabelSet) {
        self.labels = labels;
    }

    /// ラベルを追加
    ///
    /// 同じIDが別名で登録済みなら false。同一ペアの再追加は成功扱い。
    pub fn add(&mut self, label_id: i64, label_name: impl Into<String>) -> bool {
        let label_name = label_name.into();
        match self.labels.get(&label_id) {
            Some(existing) => *existing == label_name,
            None => {
                self.labels.insert(label_id, label_name);
                true
            }
        }
    }

    pub fn get_name(&self, label_id: i64) -> Option<&str> {
        self.labels.get(&label_id).map(String::as_str)
    }

    pub fn get_id(&self, label_name: &str) -> Option<i64> {
        self.labels
            .iter()
            .find(|(_, name)| name.as_str() == label_name)
            .map(|(&id, _)| id)
    }

    pub fn all(&self) -> &LabelSet {
        &self.labels
    }

    /// ID昇順の (id, name) 一覧
    pub fn sorted(&self) -> Vec<(i64, String)> {
        self.labels.iter().map(|(&id, name)| (id, name.clone())).collect()
    }

    /// ラベルが1つ以上定義されているか（アノテーション開始前のチェック用）
    pub fn has_any(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// 外部の語彙を衝突なしで取り込む
    ///
    /// 取り込み元の各ラベルについて、順に:
    /// 1. 同じ (id, name) が登録済み → そのまま
    /// 2. 同名が別IDで登録済み → 既存IDへ寄せる
    /// 3. IDが空いている → そのまま追加
    /// 4. IDが別名で使用中 → 空いている次のIDを割り当てて追加
    ///
    /// 戻り値は取り込み元ID → セッション側IDの対応表。
    pub fn merge(&mut self, incoming: &LabelSet) -> LabelRemap {
        let mut remap = LabelRemap::new();

        for (&id, name) in incoming {
            let target = if self.labels.get(&id) == Some(name) {
                id
            } else if let Some(existing) = self.get_id(name) {
                existing
            } else if !self.labels.contains_key(&id) {
                self.labels.insert(id, name.clone());
                id
            } else {
                let fresh = self.next_free_id();
                log::warn!(
                    "label id {} already names '{}'; importing '{}' as id {}",
                    id,
                    self.labels[&id],
                    name,
                    fresh
                );
                self.labels.insert(fresh, name.clone());
                fresh
            };
            remap.insert(id, target);
        }

        remap
    }

    fn next_free_id(&self) -> i64 {
        self.labels
            .keys()
            .next_back()
            .map(|&max| max.max(0) + 1)
            .unwrap_or(1)
    }
}
