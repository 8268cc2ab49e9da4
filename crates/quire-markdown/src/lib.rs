//! Markdown handling for quire.
//!
//! This crate extracts navigation metadata from Markdown sources, converts
//! them to HTML with classed syntax highlighting, and applies the textual
//! post-processing passes (section anchors, `<pre>` classes, link rewriting).

pub mod convert;
pub mod index;
pub mod postprocess;

pub use convert::{
    theme_css, ConvertError, Highlighting, MarkdownConverter, CLASS_STYLE, DEFAULT_PLAIN_LANGUAGE,
};
pub use index::{index_document, DocumentIndex, Section, FALLBACK_TITLE};
pub use postprocess::{
    HtmlPass, LinkRewriter, PostProcessor, PreClass, SectionAnchors, INDEX_SOURCE, INDEX_TARGET,
};
