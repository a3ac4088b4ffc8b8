use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// Default cap on captured subprocess stdout (2 MiB).
pub const DEFAULT_MAX_BUFFER: usize = 1024 * 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Byte cap on captured stdout. Zero falls back to [`DEFAULT_MAX_BUFFER`].
    pub max_buffer: usize,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

impl ProcessingOptions {
    pub fn with_max_buffer(max_buffer: usize) -> Self {
        Self { max_buffer }
    }

    pub fn effective_max_buffer(&self) -> usize {
        if self.max_buffer == 0 {
            DEFAULT_MAX_BUFFER
        } else {
            self.max_buffer
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    pub base: ProcessingOptions,
    /// Return trimmed plain text per page instead of the page markup.
    pub as_text: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            other => Err(Error::InvalidInput(format!(
                "unsupported image format: {other} (expected png or jpg)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailOptions {
    pub base: ProcessingOptions,
    /// 1-based page to render.
    pub page: u32,
    pub image_format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Destination directory; the configured image directory when unset.
    pub output_directory: Option<PathBuf>,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            base: ProcessingOptions::default(),
            page: 1,
            image_format: ImageFormat::Png,
            width: 160,
            height: 226,
            output_directory: None,
        }
    }
}

impl ThumbnailOptions {
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::InvalidInput("page numbers start at 1".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidInput(format!(
                "thumbnail size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub base: ProcessingOptions,
    /// Where extracted images land; the configured image directory when unset.
    pub output_directory: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_defaults() {
        let o = ThumbnailOptions::default();
        assert_eq!(o.page, 1);
        assert_eq!(o.image_format, ImageFormat::Png);
        assert_eq!((o.width, o.height), (160, 226));
        assert_eq!(o.base.max_buffer, 2_097_152);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn field_overrides_keep_other_defaults() {
        let o = ThumbnailOptions {
            page: 3,
            image_format: ImageFormat::Jpg,
            ..Default::default()
        };
        assert_eq!(o.width, 160);
        assert_eq!(o.image_format.extension(), "jpg");
    }

    #[test]
    fn zero_page_is_rejected() {
        let o = ThumbnailOptions {
            page: 0,
            ..Default::default()
        };
        assert!(matches!(o.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn zero_max_buffer_uses_default() {
        assert_eq!(
            ProcessingOptions::with_max_buffer(0).effective_max_buffer(),
            DEFAULT_MAX_BUFFER
        );
        assert_eq!(ProcessingOptions::with_max_buffer(10).effective_max_buffer(), 10);
    }

    #[test]
    fn parses_image_format() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert!("gif".parse::<ImageFormat>().is_err());
    }
}
