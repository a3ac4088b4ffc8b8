use super::{run_tool, tool_args};
use crate::config::Tool;
use crate::error::{Error, Result};
use crate::options::{ImageFormat, ImageOptions, ThumbnailOptions};
use crate::resize::{Dimensions, ImageResizer, ResizeError};
use crate::staging::with_temp_copy;
use crate::util::{ensure_dir, file_stem};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extensions recognised when collecting extracted images.
pub const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Drives the page rasterizer (`PDFToImage` / `ExtractImages`).
#[derive(Clone)]
pub struct Rasterizer {
    tool: Tool,
    staging_dir: PathBuf,
    image_dir: PathBuf,
    resizer: Arc<dyn ImageResizer>,
}

impl Rasterizer {
    pub fn new(
        tool: Tool,
        staging_dir: impl Into<PathBuf>,
        image_dir: impl Into<PathBuf>,
        resizer: Arc<dyn ImageResizer>,
    ) -> Self {
        Self {
            tool,
            staging_dir: staging_dir.into(),
            image_dir: image_dir.into(),
            resizer,
        }
    }

    /// Renders one page and scales it to exactly `width`x`height`.
    ///
    /// The result is named after `path`'s base name with the requested
    /// extension. If scaling fails the unscaled render is copied instead.
    pub async fn generate_thumbnail(&self, path: &Path, opts: &ThumbnailOptions) -> Result<PathBuf> {
        opts.validate()?;
        let out_dir = opts
            .output_directory
            .clone()
            .unwrap_or_else(|| self.image_dir.clone());
        ensure_dir(&out_dir).await?;

        let format = opts.image_format;
        let final_path = out_dir.join(format!("{}.{}", file_stem(path), format.extension()));
        let size = Dimensions {
            width: opts.width,
            height: opts.height,
        };
        let max_buffer = opts.base.effective_max_buffer();

        with_temp_copy(path, &self.staging_dir, |temp| async move {
            let page = opts.page.to_string();
            let args = tool_args(
                &self.tool,
                [
                    OsString::from("PDFToImage"),
                    "-imageType".into(),
                    format.extension().into(),
                    "-startPage".into(),
                    page.as_str().into(),
                    "-endPage".into(),
                    page.as_str().into(),
                    temp.clone().into_os_string(),
                ],
            );
            run_tool(&self.tool, args, max_buffer).await?;

            let raster = raster_output_path(&temp, opts.page, format);
            self.finish_thumbnail(&raster, &final_path, size).await?;
            Ok(final_path)
        })
        .await
    }

    async fn finish_thumbnail(&self, raster: &Path, dst: &Path, size: Dimensions) -> Result<()> {
        let resizer = Arc::clone(&self.resizer);
        let (src, out) = (raster.to_path_buf(), dst.to_path_buf());
        let resized = tokio::task::spawn_blocking(move || resizer.resize(&src, &out, size))
            .await
            .unwrap_or_else(|e| Err(ResizeError::new(format!("resize task failed: {e}"))));

        let result = match resized {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("{e}; copying unresized image to {}", dst.display());
                tokio::fs::copy(raster, dst)
                    .await
                    .map(|_| ())
                    .map_err(|e| Error::io(format!("copying {} to {}", raster.display(), dst.display()), e))
            }
        };

        if let Err(e) = tokio::fs::remove_file(raster).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove rasterizer output {}: {e}", raster.display());
            }
        }
        result
    }

    /// Extracts every embedded image into the output directory and returns
    /// their paths in directory-listing order.
    pub async fn extract_all_images(&self, path: &Path, opts: &ImageOptions) -> Result<Vec<PathBuf>> {
        let out_dir = opts
            .output_directory
            .clone()
            .unwrap_or_else(|| self.image_dir.clone());
        ensure_dir(&out_dir).await?;

        let stem = file_stem(path);
        let args = tool_args(
            &self.tool,
            [
                OsString::from("ExtractImages"),
                "-prefix".into(),
                out_dir.join(&stem).into_os_string(),
                path.as_os_str().to_os_string(),
            ],
        );
        run_tool(&self.tool, args, opts.base.effective_max_buffer()).await?;

        let images = list_images(&out_dir, &stem).await?;
        debug!("extracted {} images from {}", images.len(), path.display());
        Ok(images)
    }
}

/// Where the rasterizer writes a page render: next to the input, named
/// `<stem><page>.<ext>`.
fn raster_output_path(pdf: &Path, page: u32, format: ImageFormat) -> PathBuf {
    let dir = pdf.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}{}.{}", file_stem(pdf), page, format.extension()))
}

/// The rasterizer names extracted images `<prefix>-<n>.<ext>`.
async fn list_images(dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{stem}-");
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(format!("listing {}", dir.display()), e))?;
    let mut images = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io(format!("listing {}", dir.display()), e))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && has_raster_extension(&name) {
            images.push(entry.path());
        }
    }
    Ok(images)
}

fn has_raster_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| RASTER_EXTENSIONS.contains(&ext.as_str()))
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("tool", &self.tool)
            .field("staging_dir", &self.staging_dir)
            .field("image_dir", &self.image_dir)
            .finish_non_exhaustive()
    }
}
