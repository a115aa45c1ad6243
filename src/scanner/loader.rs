//! 画像読み込み
//!
//! コアが必要とするのは幅・高さ・形式だけ。画素データの扱いは呼び出し側次第。

use super::is_supported_image;
use crate::error::{AnnotatorError, Result};
use bbox_annotator_common::{format_from_path, ImageMeta};
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// 画像読み込み側の窓口
pub trait ImageLoader {
    /// 画素データのハンドル（不要なら `()`）
    type Handle;

    /// 読めない・壊れている・非対応のファイルはエラー
    fn load(&self, path: &Path) -> Result<(Self::Handle, ImageMeta)>;
}

fn check_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(AnnotatorError::FileNotFound(path.display().to_string()));
    }
    if !is_supported_image(path) {
        return Err(AnnotatorError::ImageLoad(format!(
            "非対応の形式: {}",
            path.display()
        )));
    }
    Ok(())
}

fn open(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>> {
    ImageReader::open(path)?
        .with_guessed_format()
        .map_err(AnnotatorError::Io)
}

/// ヘッダから寸法だけ読む（デコードしない）
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionsLoader;

impl ImageLoader for DimensionsLoader {
    type Handle = ();

    fn load(&self, path: &Path) -> Result<((), ImageMeta)> {
        check_file(path)?;
        let (width, height) = open(path)?
            .into_dimensions()
            .map_err(|e| AnnotatorError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        Ok((
            (),
            ImageMeta {
                width,
                height,
                format: format_from_path(path),
            },
        ))
    }
}

/// 全体をデコードして画素データも返す
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodingLoader;

impl ImageLoader for DecodingLoader {
    type Handle = DynamicImage;

    fn load(&self, path: &Path) -> Result<(DynamicImage, ImageMeta)> {
        check_file(path)?;
        let pixels = open(path)?
            .decode()
            .map_err(|e| AnnotatorError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        let meta = ImageMeta {
            width: pixels.width(),
            height: pixels.height(),
            format: format_from_path(path),
        };
        Ok((pixels, meta))
    }
}
