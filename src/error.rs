use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("COCO形式エラー: {0}")]
    Format(String),

    #[error("画像が登録されていません: {0}")]
    UnknownImage(String),

    #[error("対話入力エラー: {0}")]
    Interactive(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] bbox_annotator_common::Error),
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
