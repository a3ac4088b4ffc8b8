use crate::config::Config;
use crate::engine::{Extractor, Metadata, Rasterizer};
use crate::error::{Error, Result};
use crate::options::{ImageOptions, PageOptions, ProcessingOptions, ThumbnailOptions};
use crate::pages::extract_pages;
use crate::resize::{ExactFitResizer, ImageResizer};
use crate::staging::{FileStager, PdfInput, StagedInput};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Entry point for every conversion.
///
/// Each call validates its input before touching the filesystem, stages
/// buffers into a private temp file, and releases that file when the call
/// settles. Calls share nothing but the configured directories, so any number
/// may run concurrently.
#[derive(Debug, Clone)]
pub struct Processor {
    stager: FileStager,
    extractor: Extractor,
    rasterizer: Rasterizer,
    buffer_resource_name: String,
}

impl Processor {
    pub fn new(cfg: &Config) -> Self {
        Self::with_resizer(cfg, Arc::new(ExactFitResizer))
    }

    pub fn with_resizer(cfg: &Config, resizer: Arc<dyn ImageResizer>) -> Self {
        let stager = FileStager::new(&cfg.paths.staging_dir, &cfg.paths.image_dir);
        Self {
            extractor: Extractor::new(cfg.extractor.clone(), &cfg.paths.staging_dir),
            rasterizer: Rasterizer::new(
                cfg.rasterizer.clone(),
                &cfg.paths.staging_dir,
                &cfg.paths.image_dir,
                resizer,
            ),
            stager,
            buffer_resource_name: cfg.naming.buffer_resource_name.clone(),
        }
    }

    pub fn stager(&self) -> &FileStager {
        &self.stager
    }

    pub async fn to_html(&self, input: &PdfInput, opts: &ProcessingOptions) -> Result<String> {
        info!("converting {} to HTML", describe(input));
        let staged = self.stage(input).await?;
        let html = self.extractor.extract_html(staged.path(), opts).await?;
        self.normalize_html(html, &staged)
    }

    pub async fn to_text(&self, input: &PdfInput, opts: &ProcessingOptions) -> Result<String> {
        info!("converting {} to text", describe(input));
        let staged = self.stage(input).await?;
        self.extractor.extract_text(staged.path(), opts).await
    }

    pub async fn to_pages(&self, input: &PdfInput, opts: &PageOptions) -> Result<Vec<String>> {
        info!("splitting {} into pages (as_text={})", describe(input), opts.as_text);
        let staged = self.stage(input).await?;
        let html = self.extractor.extract_html(staged.path(), &opts.base).await?;
        let html = self.normalize_html(html, &staged)?;
        extract_pages(&html, opts.as_text)
    }

    pub async fn extract_metadata(&self, input: &PdfInput, opts: &ProcessingOptions) -> Result<Metadata> {
        info!("extracting metadata from {}", describe(input));
        let staged = self.stage(input).await?;
        let mut meta = self.extractor.extract_metadata(staged.path(), opts).await?;
        if staged.is_temporary() {
            meta.set_resource_name(self.buffer_resource_name.as_str());
        } else if meta.resource_name().is_none() {
            let name = staged
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            meta.set_resource_name(name);
        }
        Ok(meta)
    }

    pub async fn generate_thumbnail(&self, input: &PdfInput, opts: &ThumbnailOptions) -> Result<PathBuf> {
        info!("rendering thumbnail of {} page {}", describe(input), opts.page);
        opts.validate()?;
        let staged = self.stage(input).await?;
        self.rasterizer.generate_thumbnail(staged.path(), opts).await
    }

    pub async fn extract_images(&self, input: &PdfInput, opts: &ImageOptions) -> Result<Vec<PathBuf>> {
        info!("extracting images from {}", describe(input));
        let staged = self.stage(input).await?;
        self.rasterizer.extract_all_images(staged.path(), opts).await
    }

    async fn stage(&self, input: &PdfInput) -> Result<StagedInput> {
        self.stager.validate(input).await?;
        self.stager.ensure_directories().await?;
        self.stager.resolve_input(input).await
    }

    /// Buffer inputs leak their generated staging name through the
    /// `resourceName` meta tag; swap it for the configured placeholder.
    fn normalize_html(&self, html: String, staged: &StagedInput) -> Result<String> {
        if !staged.is_temporary() {
            return Ok(html);
        }
        let re = Regex::new(r#"(<meta\s+name="resourceName"\s+content=")[^"]*(")"#).map_err(|e| {
            Error::Parse {
                what: "resource name pattern",
                reason: e.to_string(),
                command: None,
            }
        })?;
        let replacement = format!("${{1}}{}${{2}}", self.buffer_resource_name.replace('$', "$$"));
        Ok(re.replace_all(&html, replacement.as_str()).into_owned())
    }
}

fn describe(input: &PdfInput) -> String {
    match input {
        PdfInput::Path(p) => p.display().to_string(),
        PdfInput::Buffer(b) => format!("<{} byte buffer>", b.len()),
    }
}
