//! Output locations derived from source paths.

use std::path::{Component, Path, PathBuf};

use quire_markdown::{INDEX_SOURCE, INDEX_TARGET};

/// Root-relative URL of the file generated from `relative`.
///
/// `relative` is the path below the source root, so the source root's own
/// name never appears. `README.md` becomes `index.html` in the same
/// directory, any other `.md` becomes `.html`, and every other file keeps
/// its name. Separators are always `/`.
pub fn output_url(relative: &Path) -> String {
    let url = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    if url == INDEX_SOURCE {
        INDEX_TARGET.to_string()
    } else if let Some(dir) = url.strip_suffix(&format!("/{INDEX_SOURCE}")) {
        format!("{dir}/{INDEX_TARGET}")
    } else if let Some(stem) = url.strip_suffix(".md") {
        format!("{stem}.html")
    } else {
        url
    }
}

/// Output file for `relative` under `output_root`.
pub fn output_path(output_root: &Path, relative: &Path) -> PathBuf {
    output_url(relative)
        .split('/')
        .fold(output_root.to_path_buf(), |path, part| path.join(part))
}

/// Nesting depth of a root-relative URL: `index.html` is 1, `guide/a.html` is 2.
pub fn depth(url: &str) -> usize {
    url.split('/').filter(|s| !s.is_empty()).count()
}

/// Prefix that leads from a page at `depth` back to the output root.
pub fn relative_root(depth: usize) -> String {
    "../".repeat(depth.saturating_sub(1))
}
