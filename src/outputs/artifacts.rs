//! Article artifact files.
//!
//! Each successfully generated article is written to its own UTF-8 text
//! file, named by the prompt's ordinal position in the run (`blog_1.txt`,
//! `blog_2.txt`, ...). A failed prompt leaves a gap in the numbering rather
//! than shifting later artifacts.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::PersistError;

/// Deterministic target path for the artifact at `ordinal` (1-based).
pub fn artifact_path(output_dir: &Path, ordinal: usize) -> PathBuf {
    output_dir.join(format!("blog_{ordinal}.txt"))
}

/// Write one article to its target path.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_artifact(path: &Path, text: &str) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, text)
        .await
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(bytes = text.len(), "wrote article");
    Ok(())
}
