pub mod extractor;
pub mod rasterizer;
pub mod types;

use crate::config::Tool;
use crate::error::Result;
use crate::exec::{self, ExecOptions};
use std::ffi::OsString;

pub use extractor::{ExtractMode, Extractor};
pub use rasterizer::{RASTER_EXTENSIONS, Rasterizer};
pub use types::{Metadata, MetadataValue};

/// The tool's fixed prefix arguments followed by `args`.
fn tool_args(tool: &Tool, args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    tool.args
        .iter()
        .map(OsString::from)
        .chain(args)
        .collect()
}

async fn run_tool(tool: &Tool, args: Vec<OsString>, max_buffer: usize) -> Result<String> {
    let opts = ExecOptions {
        max_buffer,
        timeout: tool.timeout(),
    };
    exec::execute(&tool.program, &args, &opts).await
}
