//! Input staging and scoped temp-file lifecycle.
//!
//! Every file or directory created here is owned by a [`TempPath`] guard that
//! removes it when the owning operation's scope ends, on success, error or
//! cancellation alike. Removal failures are logged, never returned.

use crate::error::{Error, Result};
use crate::util::{ensure_dir, unique_name};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A PDF supplied either as a file on disk or as bytes in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfInput {
    Path(PathBuf),
    Buffer(Vec<u8>),
}

impl PdfInput {
    pub fn is_buffer(&self) -> bool {
        matches!(self, PdfInput::Buffer(_))
    }
}

impl From<PathBuf> for PdfInput {
    fn from(p: PathBuf) -> Self {
        PdfInput::Path(p)
    }
}

impl From<&Path> for PdfInput {
    fn from(p: &Path) -> Self {
        PdfInput::Path(p.to_path_buf())
    }
}

impl From<&str> for PdfInput {
    fn from(p: &str) -> Self {
        PdfInput::Path(PathBuf::from(p))
    }
}

impl From<Vec<u8>> for PdfInput {
    fn from(bytes: Vec<u8>) -> Self {
        PdfInput::Buffer(bytes)
    }
}

impl From<&[u8]> for PdfInput {
    fn from(bytes: &[u8]) -> Self {
        PdfInput::Buffer(bytes.to_vec())
    }
}

/// Removes its path on drop.
#[derive(Debug)]
pub struct TempPath {
    path: PathBuf,
    is_dir: bool,
}

impl TempPath {
    pub fn file(path: PathBuf) -> Self {
        Self {
            path,
            is_dir: false,
        }
    }

    pub fn dir(path: PathBuf) -> Self {
        Self { path, is_dir: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let res = if self.is_dir {
            std::fs::remove_dir_all(&self.path)
        } else {
            std::fs::remove_file(&self.path)
        };
        match res {
            Ok(()) => debug!("removed temp path {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove temp path {}: {e}", self.path.display()),
        }
    }
}

/// A concrete on-disk path for a [`PdfInput`].
#[derive(Debug)]
pub struct StagedInput {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl StagedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// The generated file when the input was a buffer.
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_ref().map(TempPath::path)
    }
}

/// Owns the directories the crate writes into.
#[derive(Debug, Clone)]
pub struct FileStager {
    staging_dir: PathBuf,
    image_dir: PathBuf,
}

impl FileStager {
    pub fn new(staging_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            image_dir: image_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        tokio::try_join!(ensure_dir(&self.staging_dir), ensure_dir(&self.image_dir))?;
        Ok(())
    }

    /// Checks an input without touching the staging area.
    pub async fn validate(&self, input: &PdfInput) -> Result<()> {
        match input {
            PdfInput::Buffer(_) => Ok(()),
            PdfInput::Path(p) if p.as_os_str().is_empty() => {
                Err(Error::InvalidInput("empty file path".into()))
            }
            PdfInput::Path(p) => match tokio::fs::metadata(p).await {
                Ok(meta) if meta.is_file() => Ok(()),
                Ok(_) => Err(Error::InvalidInput(format!("not a file: {}", p.display()))),
                Err(_) => Err(Error::NotFound { path: p.clone() }),
            },
        }
    }

    /// Paths pass through unchanged; buffers are written to a uniquely named
    /// `.pdf` in the staging directory, removed when the result is dropped.
    pub async fn resolve_input(&self, input: &PdfInput) -> Result<StagedInput> {
        self.validate(input).await?;
        match input {
            PdfInput::Path(p) => Ok(StagedInput {
                path: p.clone(),
                temp: None,
            }),
            PdfInput::Buffer(bytes) => {
                ensure_dir(&self.staging_dir).await?;
                let path = self.staging_dir.join(unique_name(Some("pdf")));
                let guard = TempPath::file(path.clone());
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|e| Error::io(format!("writing {}", path.display()), e))?;
                debug!("staged {} byte buffer at {}", bytes.len(), path.display());
                Ok(StagedInput {
                    path,
                    temp: Some(guard),
                })
            }
        }
    }
}

/// Runs `op` on a copy of `source` placed in `working_dir`, removing the
/// copy once `op` settles.
///
/// The copy keeps the source's file name but sits in its own uniquely named
/// subdirectory, so concurrent calls on the same source never share a copy.
/// A source already inside `working_dir` is used in place.
pub async fn with_temp_copy<T, F, Fut>(source: &Path, working_dir: &Path, op: F) -> Result<T>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if resides_in(source, working_dir).await {
        return op(source.to_path_buf()).await;
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("no file name in {}", source.display())))?;

    let scope_dir = working_dir.join(unique_name(None));
    ensure_dir(&scope_dir).await?;
    let _guard = TempPath::dir(scope_dir.clone());

    let temp = scope_dir.join(file_name);
    tokio::fs::copy(source, &temp).await.map_err(|e| {
        Error::io(
            format!("copying {} to {}", source.display(), temp.display()),
            e,
        )
    })?;

    op(temp).await
}

async fn resides_in(path: &Path, dir: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    match (
        tokio::fs::canonicalize(parent).await,
        tokio::fs::canonicalize(dir).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => parent == dir,
    }
}
