use image::imageops::FilterType;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("image resize failed: {0}")]
pub struct ResizeError(String);

impl From<image::ImageError> for ResizeError {
    fn from(e: image::ImageError) -> Self {
        ResizeError(e.to_string())
    }
}

impl ResizeError {
    pub fn new(msg: impl Into<String>) -> Self {
        ResizeError(msg.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Resizes `src` into `dst`. Called from a blocking thread.
pub trait ImageResizer: Send + Sync {
    fn resize(&self, src: &Path, dst: &Path, size: Dimensions) -> Result<(), ResizeError>;
}

/// Exact-fit scaling: the output is always `width`x`height`, aspect ratio
/// is not preserved. Output encoding follows `dst`'s extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactFitResizer;

impl ImageResizer for ExactFitResizer {
    fn resize(&self, src: &Path, dst: &Path, size: Dimensions) -> Result<(), ResizeError> {
        let img = image::open(src)?;
        img.resize_exact(size.width, size.height, FilterType::Triangle)
            .save(dst)?;
        Ok(())
    }
}
