//! Site-wide navigation menu.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// One document in the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    /// Markdown source this entry was built from
    #[serde(skip)]
    pub source_path: PathBuf,

    /// Number of URL segments, at least 1
    pub depth: usize,

    /// Document title
    pub title: String,

    /// Level-2 headings in document order
    pub sections: Vec<MenuSection>,

    /// URL relative to the output root (or to the current page once localized)
    pub url: String,

    /// Whether this entry is the page being rendered
    pub selected: bool,
}

/// A deep link into one section of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub title: String,

    /// Anchor number on the rendered page; `None` links to the page itself
    pub anchor: Option<usize>,
}

impl From<quire_markdown::Section> for MenuSection {
    fn from(section: quire_markdown::Section) -> Self {
        Self {
            title: section.name,
            anchor: section.anchor,
        }
    }
}

/// The global menu, in canonical navigation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    /// Order entries by depth, then by URL.
    pub fn build(mut entries: Vec<MenuEntry>) -> Self {
        entries.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));
        Self { entries }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the menu as seen from the page built from `current`.
    ///
    /// Every URL is prefixed with `root` and the entry for `current` is
    /// marked selected. The global menu is left untouched.
    pub fn localize(&self, current: &Path, root: &str) -> Vec<MenuEntry> {
        self.entries
            .iter()
            .map(|entry| MenuEntry {
                selected: entry.source_path == current,
                url: format!("{root}{}", entry.url).replace("/./", "/"),
                ..entry.clone()
            })
            .collect()
    }
}
