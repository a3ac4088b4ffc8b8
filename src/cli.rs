use crate::{
    config::Config,
    options::{ImageFormat, ImageOptions, PageOptions, ProcessingOptions, ThumbnailOptions},
    processor::Processor,
    staging::PdfInput,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdf2html")]
#[command(about = "Convert PDFs to HTML, text, pages, metadata, thumbnails and images")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./pdf2html.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Cap on captured tool output in bytes.
    #[arg(long, global = true)]
    pub max_buffer: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the document as HTML.
    Html {
        /// PDF path, or `-` to read the PDF from stdin.
        input: String,
    },
    /// Print the document as plain text.
    Text { input: String },
    /// Print a JSON array with one entry per page.
    Pages {
        input: String,
        /// Emit trimmed text instead of page markup.
        #[arg(long)]
        text: bool,
    },
    /// Print document metadata as JSON.
    Meta { input: String },
    /// Render one page to a thumbnail and print its path.
    Thumbnail {
        input: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "png")]
        format: ImageFormat,
        #[arg(long, default_value_t = 160)]
        width: u32,
        #[arg(long, default_value_t = 226)]
        height: u32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Extract embedded images and print their paths as JSON.
    Images {
        input: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    let processor = Processor::new(&cfg);
    let base = ProcessingOptions::with_max_buffer(args.max_buffer.unwrap_or(cfg.limits.max_buffer));

    match args.cmd {
        Command::Html { input } => {
            let input = read_input(&input).await?;
            print!("{}", processor.to_html(&input, &base).await?);
        }
        Command::Text { input } => {
            let input = read_input(&input).await?;
            print!("{}", processor.to_text(&input, &base).await?);
        }
        Command::Pages { input, text } => {
            let input = read_input(&input).await?;
            let opts = PageOptions { base, as_text: text };
            let pages = processor.to_pages(&input, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
        Command::Meta { input } => {
            let input = read_input(&input).await?;
            let meta = processor.extract_metadata(&input, &base).await?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Command::Thumbnail {
            input,
            page,
            format,
            width,
            height,
            out_dir,
        } => {
            let input = read_input(&input).await?;
            let opts = ThumbnailOptions {
                base,
                page,
                image_format: format,
                width,
                height,
                output_directory: out_dir,
            };
            let path = processor.generate_thumbnail(&input, &opts).await?;
            println!("{}", path.display());
        }
        Command::Images { input, out_dir } => {
            let input = read_input(&input).await?;
            let opts = ImageOptions {
                base,
                output_directory: out_dir,
            };
            let images = processor.extract_images(&input, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&images)?);
        }
    }
    Ok(())
}

async fn read_input(raw: &str) -> Result<PdfInput> {
    if raw != "-" {
        return Ok(PdfInput::Path(PathBuf::from(raw)));
    }
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .with_context(|| "reading PDF from stdin")?;
    Ok(PdfInput::Buffer(bytes))
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("pdf2html.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {}", parent.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("pdf2html.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thumbnail_flags() {
        let args = Args::try_parse_from([
            "pdf2html", "thumbnail", "a.pdf", "--page", "2", "--format", "jpg", "--width", "80",
        ])
        .unwrap();
        match args.cmd {
            Command::Thumbnail {
                page,
                format,
                width,
                height,
                ..
            } => {
                assert_eq!(page, 2);
                assert_eq!(format, ImageFormat::Jpg);
                assert_eq!((width, height), (80, 226));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from(["pdf2html", "pages", "a.pdf", "--text", "--max-buffer", "10"])
            .unwrap();
        assert_eq!(args.max_buffer, Some(10));
        assert!(matches!(args.cmd, Command::Pages { text: true, .. }));
    }

    #[tokio::test]
    async fn plain_argument_is_a_path() {
        let input = read_input("doc.pdf").await.unwrap();
        assert_eq!(input, PdfInput::Path(PathBuf::from("doc.pdf")));
    }
}
