use crate::error::{Error, Result};
use std::path::Path;

/// Idempotent; concurrent callers racing on the same path all succeed.
pub async fn ensure_dir(p: &Path) -> Result<()> {
    tokio::fs::create_dir_all(p)
        .await
        .map_err(|e| Error::io(format!("create_dir_all {}", p.display()), e))
}

/// Collision-resistant name: wall-clock nanoseconds plus a random suffix.
pub fn unique_name(extension: Option<&str>) -> String {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    match extension {
        Some(ext) => format!("{nanos}-{}.{ext}", &suffix[..12]),
        None => format!("{nanos}-{}", &suffix[..12]),
    }
}

/// File name without its extension, as a lossy string.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
