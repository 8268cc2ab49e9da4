//! Title and section extraction for the navigation menu.

use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};
use regex::Regex;

use crate::convert::markdown_options;

static RAW_H2_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h2[\s>]").expect("valid regex"));

/// Title used when a document has no level-1 heading.
pub const FALLBACK_TITLE: &str = "TOC";

/// Navigation metadata extracted from one Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIndex {
    /// Text of the first level-1 heading, or [`FALLBACK_TITLE`]
    pub title: String,

    /// Every level-2 heading line, in document order
    pub sections: Vec<Section>,
}

/// A level-2 heading line and the anchor its rendered `<h2>` receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,

    /// Number assigned by the section anchor pass, or `None` when the line
    /// does not render as a heading (for example inside a fenced block)
    pub anchor: Option<usize>,
}

/// Index a Markdown document.
///
/// Works line by line: a level-1 heading is a line starting with `"# "`,
/// a level-2 heading a line starting with `"## "`. Deeper headings are
/// ignored. Never fails; a document without a title gets the fallback.
///
/// Anchors are taken from the parsed document, so setext headings and raw
/// `<h2>` elements shift the numbering exactly as they do on the page.
pub fn index_document(source: &str) -> DocumentIndex {
    let anchors = heading_anchors(source);
    let mut title = None;
    let mut sections = Vec::new();

    for (number, line) in source.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(text) = heading_text(line, 1) {
            if title.is_none() {
                title = Some(text);
            }
        } else if let Some(name) = heading_text(line, 2) {
            sections.push(Section {
                name,
                anchor: anchors.get(&number).copied(),
            });
        }
    }

    DocumentIndex {
        title: title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        sections,
    }
}

/// Anchor number of every rendered level-2 heading, keyed by its source line.
fn heading_anchors(source: &str) -> HashMap<usize, usize> {
    let mut anchors = HashMap::new();
    let mut counter = 0;

    for (event, range) in Parser::new_ext(source, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H2,
                ..
            }) => {
                counter += 1;
                let line = source[..range.start].matches('\n').count();
                anchors.insert(line, counter);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                counter += RAW_H2_OPEN.find_iter(&html).count();
            }
            _ => {}
        }
    }

    anchors
}

/// Returns the trimmed heading text if `line` is an ATX heading of exactly `level`.
fn heading_text(line: &str, level: usize) -> Option<String> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes != level {
        return None;
    }

    line[level..]
        .strip_prefix(' ')
        .map(|rest| rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(index: &DocumentIndex) -> Vec<&str> {
        index.sections.iter().map(|s| s.name.as_str()).collect()
    }

    fn anchors(index: &DocumentIndex) -> Vec<Option<usize>> {
        index.sections.iter().map(|s| s.anchor).collect()
    }

    #[test]
    fn extracts_title_and_sections() {
        let source = "# Guide\n\nIntro.\n\n## One\n\ntext\n\n### Deep\n\n## Two\n";

        let index = index_document(source);

        assert_eq!(index.title, "Guide");
        assert_eq!(names(&index), vec!["One", "Two"]);
        assert_eq!(anchors(&index), vec![Some(1), Some(2)]);
    }

    #[test]
    fn falls_back_without_title() {
        let index = index_document("Just a paragraph.\n\n## Only a section\n");

        assert_eq!(index.title, FALLBACK_TITLE);
        assert_eq!(names(&index), vec!["Only a section"]);
    }

    #[test]
    fn empty_document_uses_fallback() {
        let index = index_document("");

        assert_eq!(index.title, "TOC");
        assert!(index.sections.is_empty());
    }

    #[test]
    fn first_title_wins() {
        let index = index_document("# First\n# Second\n");

        assert_eq!(index.title, "First");
    }

    #[test]
    fn requires_space_after_marker() {
        let index = index_document("#hashtag\n##nospace\n#\n");

        assert_eq!(index.title, FALLBACK_TITLE);
        assert!(index.sections.is_empty());
    }

    #[test]
    fn handles_crlf_lines() {
        let index = index_document("# Title\r\n## Part  \r\n");

        assert_eq!(index.title, "Title");
        assert_eq!(names(&index), vec!["Part"]);
        assert_eq!(anchors(&index), vec![Some(1)]);
    }

    #[test]
    fn anchors_follow_rendered_headings() {
        let source = "# H\n\nIntro\n-----\n\n## Install\n\n```text\n## not a heading\n```\n\n## Usage\n";

        let index = index_document(source);

        assert_eq!(names(&index), vec!["Install", "not a heading", "Usage"]);
        assert_eq!(anchors(&index), vec![Some(2), None, Some(3)]);
    }

    #[test]
    fn raw_html_headings_take_an_anchor() {
        let source = "<h2>Raw</h2>\n\n## Next\n";

        let index = index_document(source);

        assert_eq!(anchors(&index), vec![Some(2)]);
    }
}
