//! Source tree enumeration.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as found on disk
    pub path: PathBuf,

    /// Path below the source root
    pub relative: PathBuf,

    /// File name
    pub base_name: String,

    /// Extension without the dot (empty if none)
    pub extension: String,
}

impl SourceFile {
    /// Whether this is a Markdown source.
    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }
}

/// Errors that can occur while walking the source tree.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("Source directory not found: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// List every file below `root`, depth first.
///
/// Entries come in the order the filesystem reports them. Directories are
/// descended into but not returned. The first unreadable entry aborts the walk.
pub fn walk(root: &Path) -> Result<Vec<SourceFile>, WalkError> {
    if !root.is_dir() {
        return Err(WalkError::MissingRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let base_name = entry.file_name().to_string_lossy().to_string();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        files.push(SourceFile {
            path,
            relative,
            base_name,
            extension,
        });
    }

    tracing::debug!("Found {} files under {}", files.len(), root.display());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_nested_files_only() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("book");
        fs::create_dir_all(root.join("guide/deep")).unwrap();
        fs::write(root.join("README.md"), "# Intro").unwrap();
        fs::write(root.join("guide/a.md"), "# A").unwrap();
        fs::write(root.join("guide/deep/logo.png"), [0u8, 1, 2]).unwrap();

        let mut relative: Vec<PathBuf> = walk(&root)
            .unwrap()
            .into_iter()
            .map(|f| f.relative)
            .collect();
        relative.sort();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("guide").join("a.md"),
                PathBuf::from("guide").join("deep").join("logo.png"),
            ]
        );
    }

    #[test]
    fn records_name_and_extension() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("page.md"), "").unwrap();
        fs::write(temp.path().join("LICENSE"), "").unwrap();

        let mut files = walk(temp.path()).unwrap();
        files.sort_by(|a, b| a.base_name.cmp(&b.base_name));

        assert_eq!(files[0].base_name, "LICENSE");
        assert_eq!(files[0].extension, "");
        assert!(!files[0].is_markdown());
        assert_eq!(files[1].base_name, "page.md");
        assert_eq!(files[1].extension, "md");
        assert!(files[1].is_markdown());
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempdir().unwrap();

        let result = walk(&temp.path().join("nope"));

        assert!(matches!(result, Err(WalkError::MissingRoot(_))));
    }

    #[cfg(unix)]
    #[test]
    fn broken_entry_aborts_walk() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("book");
        fs::create_dir_all(root.join("guide")).unwrap();
        fs::write(root.join("README.md"), "# Intro").unwrap();
        std::os::unix::fs::symlink(root.join("missing.png"), root.join("guide/dead.png")).unwrap();

        let result = walk(&root);

        assert!(matches!(result, Err(WalkError::Walk(_))));
    }
}
