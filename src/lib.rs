//! Converts PDFs to HTML, text, pages, metadata, thumbnails and extracted
//! images by driving an external extractor and rasterizer.
//!
//! ```rust,no_run
//! use pdf2html::{Config, PdfInput, ProcessingOptions, Processor};
//!
//! # async fn demo() -> pdf2html::Result<()> {
//! let processor = Processor::new(&Config::default());
//! let html = processor
//!     .to_html(&PdfInput::from("sample.pdf"), &ProcessingOptions::default())
//!     .await?;
//! # let _ = html;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod options;
pub mod pages;
pub mod processor;
pub mod resize;
pub mod staging;
pub mod util;

pub use config::Config;
pub use engine::{Metadata, MetadataValue};
pub use error::{Error, ErrorKind, Result};
pub use options::{ImageFormat, ImageOptions, PageOptions, ProcessingOptions, ThumbnailOptions};
pub use processor::Processor;
pub use resize::{Dimensions, ExactFitResizer, ImageResizer, ResizeError};
pub use staging::PdfInput;
