use crate::error::{AnnotatorError, Result};
use crate::session::Session;
use bbox_annotator_common::LabelSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// セッション開始時に読み込むラベル語彙
    pub labels: LabelSet,
    /// COCO出力で相対パスの file_name を使うか
    pub use_relative_paths: bool,
    pub validation_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            labels: LabelSet::new(),
            use_relative_paths: true,
            validation_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AnnotatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("bbox-annotator").join("config.json"))
    }

    /// 設定のラベル語彙で始まるセッション
    pub fn session(&self) -> Session {
        Session::with_labels(self.labels.clone(), self.validation_enabled)
    }
}

/// `ID=NAME` 形式のラベル指定を解析
pub fn parse_label_spec(spec: &str) -> Result<(i64, String)> {
    let (id, name) = spec
        .split_once('=')
        .ok_or_else(|| AnnotatorError::Config(format!("ID=NAME 形式で指定してください: {}", spec)))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| AnnotatorError::Config(format!("ラベルIDが数値ではありません: {}", id)))?;
    let name = name.trim();
    if id <= 0 || name.is_empty() {
        return Err(AnnotatorError::Config(format!("不正なラベル指定: {}", spec)));
    }
    Ok((id, name.to_string()))
}
