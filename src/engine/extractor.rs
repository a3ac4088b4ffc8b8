use super::{Metadata, run_tool, tool_args};
use crate::config::Tool;
use crate::error::{Error, Result};
use crate::exec::command_line;
use crate::options::ProcessingOptions;
use crate::staging::with_temp_copy;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    Html,
    Text,
    Json,
}

impl ExtractMode {
    pub fn flag(self) -> &'static str {
        match self {
            ExtractMode::Html => "--html",
            ExtractMode::Text => "--text",
            ExtractMode::Json => "--json",
        }
    }
}

/// Drives the content extractor (`<tool> --<mode> <file>`).
///
/// Whatever the tool prints is passed through; non-PDF input that the tool
/// chooses to treat as plain text is not special-cased here.
#[derive(Debug, Clone)]
pub struct Extractor {
    tool: Tool,
    staging_dir: PathBuf,
}

impl Extractor {
    pub fn new(tool: Tool, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            staging_dir: staging_dir.into(),
        }
    }

    pub async fn extract_html(&self, path: &Path, opts: &ProcessingOptions) -> Result<String> {
        debug!("converting {} to HTML", path.display());
        self.extract(path, ExtractMode::Html, opts).await
    }

    pub async fn extract_text(&self, path: &Path, opts: &ProcessingOptions) -> Result<String> {
        debug!("converting {} to text", path.display());
        self.extract(path, ExtractMode::Text, opts).await
    }

    pub async fn extract_metadata(&self, path: &Path, opts: &ProcessingOptions) -> Result<Metadata> {
        debug!("extracting metadata from {}", path.display());
        let max_buffer = opts.effective_max_buffer();
        with_temp_copy(path, &self.staging_dir, |temp| async move {
            let args = self.args(ExtractMode::Json, temp);
            let raw = run_tool(&self.tool, args.clone(), max_buffer).await?;
            Metadata::from_json(&raw).map_err(|e| Error::Parse {
                what: "metadata JSON",
                reason: e.to_string(),
                command: Some(command_line(&self.tool.program, &args)),
            })
        })
        .await
    }

    async fn extract(&self, path: &Path, mode: ExtractMode, opts: &ProcessingOptions) -> Result<String> {
        let max_buffer = opts.effective_max_buffer();
        with_temp_copy(path, &self.staging_dir, |temp| async move {
            run_tool(&self.tool, self.args(mode, temp), max_buffer).await
        })
        .await
    }

    fn args(&self, mode: ExtractMode, file: PathBuf) -> Vec<OsString> {
        tool_args(&self.tool, [OsString::from(mode.flag()), file.into_os_string()])
    }
}
