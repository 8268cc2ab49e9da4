//! Binary asset copying and overlay files.

use std::io;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::walker::SourceFile;

/// Stylesheets copied from the overlay directory on every build.
pub const OVERLAY_STYLESHEETS: [&str; 3] = ["reset.css", "main.css", "markdown.css"];

/// Output name of the generated highlighting theme stylesheet.
pub const THEME_STYLESHEET: &str = "hljs-theme.css";

/// Errors that can occur while copying assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Highlighting theme: {0}")]
    Theme(#[from] quire_markdown::ConvertError),

    #[error("Asset task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Copies allow-listed binary files verbatim.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    extensions: Vec<String>,
}

impl AssetCopier {
    /// Create a copier for the given extensions (without the dot).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `file` is copied by this copier.
    pub fn is_asset(&self, file: &SourceFile) -> bool {
        self.extensions.iter().any(|ext| *ext == file.extension)
    }

    /// Copy `from` to `to` byte for byte.
    pub async fn copy(&self, from: &Path, to: &Path) -> Result<u64, AssetError> {
        tokio::fs::copy(from, to)
            .await
            .map_err(|source| AssetError::Copy {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
    }
}

impl Default for AssetCopier {
    fn default() -> Self {
        Self::new(["png", "jpg"])
    }
}

/// Fixed files written to the output root once per build.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Directory holding the overlay stylesheets
    pub dir: PathBuf,

    /// Stylesheet names copied from `dir`
    pub stylesheets: Vec<String>,

    /// Name of the bundled highlighting theme
    pub theme: String,
}

impl Overlay {
    pub fn new(dir: impl Into<PathBuf>, theme: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stylesheets: OVERLAY_STYLESHEETS.iter().map(|s| s.to_string()).collect(),
            theme: theme.into(),
        }
    }

    /// Copy the stylesheets and write the theme stylesheet into `output_dir`.
    ///
    /// All files are written concurrently; the first failure is returned.
    /// Returns the number of files written.
    pub async fn write(&self, output_dir: &Path) -> Result<usize, AssetError> {
        let theme_css = quire_markdown::theme_css(&self.theme)?;

        let mut tasks = JoinSet::new();

        for name in &self.stylesheets {
            let from = self.dir.join(name);
            let to = output_dir.join(name);
            tasks.spawn(async move {
                tokio::fs::copy(&from, &to)
                    .await
                    .map(|_| ())
                    .map_err(|source| AssetError::Copy { from, to, source })
            });
        }

        let path = output_dir.join(THEME_STYLESHEET);
        tasks.spawn(async move {
            tokio::fs::write(&path, theme_css)
                .await
                .map_err(|source| AssetError::Write { path, source })
        });

        let mut written = 0;
        while let Some(result) = tasks.join_next().await {
            result??;
            written += 1;
        }

        tracing::debug!("Wrote {} overlay files to {}", written, output_dir.display());

        Ok(written)
    }
}
